//! Data-access layer over the embedded SQLite file. All mutations serialize
//! through the single sea-orm connection; each logical operation is one
//! transaction (a plain insert, a ranged delete, a settings batch).

pub mod events;
pub mod readings;
pub mod settings;

use chrono::Utc;

/// Current time in milliseconds since epoch, the readings primary key domain.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
