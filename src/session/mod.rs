/*!
 * Session management module for conversion results.
 *
 * This module provides:
 * - Storage of finished conversions keyed by session id
 * - Per-user conversion history
 * - Cleanup of old sessions
 */

pub mod manager;
pub mod models;

// Re-export main types
pub use manager::SessionManager;
pub use models::{ConversionSession, RemovedSession};
