//! Global activity log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Actor name recorded on entries no signed-in account produced.
pub const SYSTEM_ACTOR: &str = "System";

/// One entry in the global activity log.
///
/// The global log mirrors noteworthy events across all tickets and
/// panels. It is capped; the oldest entries fall off the front.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlobalLogEntry {
    pub date: DateTime<Utc>,
    /// Display name of whoever acted, or `"System"`.
    pub actor: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}
