//! Domain layer - Core business logic and entities

pub mod entitlement;
pub mod error;
pub mod identity;
pub mod key;
pub mod quota;
pub mod store;
pub mod token;

pub use entitlement::{evaluate_counter, Entitlement, EntitlementStatus};
pub use error::{DomainError, EntitlementLapse};
pub use identity::{Identity, IdentityCodec, Secret, CANONICAL_SECRET_LEN};
pub use key::{ApiKeyRecord, ManagementKey, Principal, Role};
pub use quota::{validate_route, RouteQuotaSnapshot};
pub use store::{KeySpace, KeyValueStore, KeyValueStoreExt, MANAGEMENT_HASH, PROVISIONED_HASH};
pub use token::{Token, TokenRecord, TOKEN_HEX_LEN};
