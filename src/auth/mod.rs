/*!
 * Accounts and logins.
 *
 * Passwords are stored as Argon2id PHC strings. A login hands the browser a
 * random token; only its SHA-256 is stored, with an expiry.
 */

pub mod password;
pub mod service;

pub use password::PasswordHasher;
pub use service::{hash_token, AuthService, AuthSession};
