//! Token domain

mod entity;

pub use entity::{Token, TokenRecord, CHALLENGE_LEN, TOKEN_HEX_LEN};
