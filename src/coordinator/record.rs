//! Composite task records and namespaced merging
//!
//! A refresh cycle flattens several independently-fetched payloads onto
//! one record per task. Each payload gets its own key prefix so fields
//! from different sources never collide; two sources writing the same
//! prefixed key would silently overwrite, which is accepted.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::dsm::constants::DATA_KEY;
use crate::dsm::models::RawTask;

/// Namespace prefix for the last-run result payload
pub const PREFIX_LAST_RESULT: &str = "last_result_";
/// Namespace prefix for the live status payload
pub const PREFIX_STATUS: &str = "status_";
/// Namespace prefix for the progress sub-object of the status payload
pub const PREFIX_STATUS_PROGRESS: &str = "status_progress_";
/// Namespace prefix for the correlated integrity-check log entry
pub const PREFIX_INTEGRITY_CHECK: &str = "integrity_check_";

/// One task with everything a cycle learned about it
///
/// Records are rebuilt from scratch every cycle; identity across cycles
/// is established only by `id`.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRecord {
    /// Scheduler task id
    pub id: i64,
    /// Task name
    pub name: String,
    /// Task type
    pub task_type: String,
    /// Owning user
    pub owner: String,
    /// Whether the task is enabled
    pub enabled: bool,
    /// Whether the task can be triggered manually
    pub can_run: bool,
    /// Next scheduled trigger time, if any
    pub next_run_time: Option<String>,
    /// Namespaced fields added by the merge, keyed `<prefix><inner key>`
    pub fields: BTreeMap<String, Value>,
}

impl From<RawTask> for TaskRecord {
    fn from(raw: RawTask) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            task_type: raw.task_type,
            owner: raw.owner,
            enabled: raw.enable,
            can_run: raw.can_run,
            next_run_time: raw.next_trigger_time,
            fields: BTreeMap::new(),
        }
    }
}

impl TaskRecord {
    /// Merge a payload's inner fields onto this record under `prefix`
    ///
    /// The payload's `data` member is used when present; a payload
    /// without one is merged as-is. Whichever of the two is selected
    /// must be an object, otherwise nothing is merged. Base fields are
    /// never touched.
    pub fn merge_with_prefix(&mut self, payload: &Value, prefix: &str) {
        let inner = match payload.get(DATA_KEY) {
            Some(Value::Object(data)) => data,
            Some(_) => return,
            None => match payload {
                Value::Object(map) => map,
                _ => return,
            },
        };
        for (key, value) in inner {
            self.fields.insert(format!("{prefix}{key}"), value.clone());
        }
    }

    /// Look up a namespaced field added by the merge
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Convert a value to a JSON number if it is numeric
///
/// Numbers pass through; numeric strings become integers when integral
/// (`"42"` → `42`) and floats otherwise (`"42.5"` → `42.5`). Booleans
/// and non-numeric strings are never numeric.
pub fn coerce_numeric(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(_) => None,
        Value::Number(_) => Some(value.clone()),
        Value::String(text) => {
            let parsed: f64 = text.trim().parse().ok()?;
            if parsed.is_finite() && parsed.fract() == 0.0 {
                Some(Value::from(parsed as i64))
            } else {
                serde_json::Number::from_f64(parsed).map(Value::Number)
            }
        }
        _ => None,
    }
}
