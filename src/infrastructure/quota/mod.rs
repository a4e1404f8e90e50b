//! Route quota infrastructure

mod route_quota;

pub use route_quota::RouteQuota;
