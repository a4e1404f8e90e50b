//! Identity domain - secrets, public keys and addresses

mod codec;
mod secret;

pub use codec::{DIGEST_LEN, Identity, IdentityCodec, RECOVERABLE_SIGNATURE_LEN};
pub use secret::{CANONICAL_SECRET_LEN, SCALAR_LEN, Secret};
