//! API middleware components

pub mod auth;
pub mod logging;

pub use auth::{
    presented_key, RequireKey, RequireManagement, RequireToken, KEY_HEADER,
    TOKEN_HEADER,
};
pub use logging::logging_middleware;
