//! Infrastructure layer - store backends and the services built on them

pub mod entitlement;
pub mod gate;
pub mod key;
pub mod logging;
pub mod quota;
pub mod store;
pub mod token;

#[cfg(test)]
pub mod testing;
