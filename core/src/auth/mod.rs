// booknest/core/src/auth/mod.rs

//! Identity: password hashing and signed bearer tokens.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{Claims, TokenIssuer, MIN_SECRET_LEN};
