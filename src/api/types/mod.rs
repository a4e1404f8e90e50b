//! Request and response types shared by every endpoint

pub mod envelope;
pub mod error;
pub mod json;

pub use envelope::{ok, Envelope, ResultStatus};
pub use error::{ApiError, ApiErrorResponse};
pub use json::Json;
