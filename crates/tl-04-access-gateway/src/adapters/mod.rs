//! # Adapters
//!
//! - `password`: Argon2 `CredentialHasher` producing PHC strings

pub mod password;

pub use password::Argon2Hasher;
