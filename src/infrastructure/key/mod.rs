//! Key infrastructure - secret generation and the key registry

mod generator;
mod registry;

pub use generator::SecretGenerator;
pub use registry::KeyRegistry;
