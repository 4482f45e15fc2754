//! Local credential vault.
//!
//! Passwords are stored as salted PBKDF2-HMAC-SHA256 hashes and compared in
//! constant time. The schema keeps the lock flag and location/battery
//! columns of the mobile app's user table; no flow populates them yet.

pub mod password;
pub mod store;

pub use store::{CredentialStore, NewUser, Role, UserRecord};
