//! # Progress Normalization
//!
//! Maps raw lifecycle state and metadata from the task state store into the
//! payload returned to polling clients. Pure: no store access, no logging.
//!
//! | state | payload |
//! |---|---|
//! | `PENDING` / empty | progress 0, "Task is pending..." |
//! | `PROGRESS` | `current`/`total`/`progress`/`status` from metadata, with defaults |
//! | `SUCCESS` | progress 100, "Task completed!" (result attached separately) |
//! | `FAILURE` | progress 0, "Task failed: <reason>" |
//! | anything else | progress 0, "State: <name>" |

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::{status, COMPLETE_PROGRESS};
use crate::state_machine::TaskState;

const DEFAULT_CURRENT: i64 = 0;
const DEFAULT_TOTAL: i64 = 1;
const DEFAULT_PROGRESS: i64 = 0;

/// Client-facing progress payload
///
/// Always carries the `state`/`progress`/`status` triple; `current` and
/// `total` appear only for `PROGRESS`, `result` only on a successful result
/// read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressPayload {
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    pub progress: i64,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl ProgressPayload {
    fn simple(state: TaskState, progress: i64, status: impl Into<String>) -> Self {
        Self {
            state,
            current: None,
            total: None,
            progress,
            status: status.into(),
            result: None,
        }
    }

    /// Payload for an identifier the store does not know
    pub fn not_found() -> Self {
        Self::simple(TaskState::NotFound, 0, status::NOT_FOUND)
    }

    pub fn is_success(&self) -> bool {
        self.state == TaskState::Success
    }

    /// Downgrade to `ERROR` after the final value failed to load
    ///
    /// Only the payload changes; the stored `SUCCESS` record is untouched.
    pub fn mark_result_error(&mut self, fault: impl std::fmt::Display) {
        self.state = TaskState::Error;
        self.progress = 0;
        self.status = format!("{}{fault}", status::RESULT_LOAD_FAILED_PREFIX);
        self.result = None;
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Normalize raw store state and metadata into a client payload
pub fn normalize(state: &TaskState, meta: Option<&Value>) -> ProgressPayload {
    match state {
        TaskState::Pending => ProgressPayload::simple(TaskState::Pending, 0, status::PENDING),
        TaskState::Progress => {
            let field = |name: &str| meta.and_then(|m| m.get(name));
            ProgressPayload {
                state: TaskState::Progress,
                current: Some(coerce_int(field("current"), DEFAULT_CURRENT)),
                total: Some(coerce_int(field("total"), DEFAULT_TOTAL)),
                progress: coerce_int(field("progress"), DEFAULT_PROGRESS),
                status: coerce_string(field("status"), status::PROCESSING),
                result: None,
            }
        }
        TaskState::Success => ProgressPayload::simple(
            TaskState::Success,
            i64::from(COMPLETE_PROGRESS),
            status::COMPLETED,
        ),
        TaskState::Failure => {
            let reason = match meta {
                None | Some(Value::Null) => status::UNKNOWN_FAILURE_REASON.to_string(),
                Some(Value::String(reason)) => reason.clone(),
                Some(other) => other.to_string(),
            };
            ProgressPayload::simple(
                TaskState::Failure,
                0,
                format!("{}{reason}", status::FAILED_PREFIX),
            )
        }
        other => ProgressPayload::simple(other.clone(), 0, format!("State: {other}")),
    }
}

/// Coerce a metadata field to an integer, falling back to `default`
///
/// Accepts integers, floats (truncated), booleans and numeric strings.
fn coerce_int(value: Option<&Value>, default: i64) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                    .map(|f| f.trunc() as i64)
            })
            .unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(default),
        Some(Value::Bool(b)) => i64::from(*b),
        _ => default,
    }
}

/// Coerce a metadata field to text, falling back to `default`
fn coerce_string(value: Option<&Value>, default: &str) -> String {
    match value {
        None | Some(Value::Null) => default.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
