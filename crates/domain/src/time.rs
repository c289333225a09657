//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp stamped onto every status payload.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Milliseconds since the Unix epoch, the `ts` wire format of status payloads.
#[must_use]
pub fn epoch_millis(ts: Timestamp) -> i64 {
    ts.timestamp_millis()
}
