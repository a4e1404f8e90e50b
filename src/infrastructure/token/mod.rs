//! Token infrastructure - token cache and authority

mod authority;
mod cache;

pub use authority::TokenAuthority;
pub use cache::{TokenCache, TokenCacheConfig};
