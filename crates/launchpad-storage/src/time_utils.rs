use chrono::Utc;

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Get current timestamp in milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
