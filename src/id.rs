//! ID generation utilities for MedCore
//!
//! Provides identifiers for conversation messages.

use rand::Rng;

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

/// Generate a unique message ID
///
/// Format: `msg-{timestamp_ms}-{random_hex}`
/// Example: `msg-1738300800123-a1b2`
pub fn generate_message_id() -> String {
    let timestamp = now_ms();
    let random: u16 = rand::rng().random();
    format!("msg-{}-{:04x}", timestamp, random)
}
