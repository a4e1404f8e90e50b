//! Access gate

mod access_gate;

pub use access_gate::AccessGate;
