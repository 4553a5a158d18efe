/*!
 * Database module for persistent storage of accounts and conversions.
 *
 * This module provides SQLite-based persistence for:
 * - Registered users and their login sessions
 * - Conversion jobs with per-file records and errors
 * - Per-file conversion history of logged-in users
 */

pub mod schema;
pub mod connection;
pub mod repository;
pub mod models;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use repository::{ConversionBundle, Repository};
