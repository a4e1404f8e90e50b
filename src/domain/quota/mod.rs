//! Route quota domain

mod entity;

pub use entity::{validate_route, RouteQuotaSnapshot};
