//! Wire types for the DSM web API
//!
//! DSM wraps every response in the same envelope: `success`, an optional
//! `data` payload, and an optional `error` object. Payload shapes vary
//! per endpoint, so `data` stays a raw [`serde_json::Value`] here and is
//! decoded further by the caller that knows the endpoint.

use serde::Deserialize;
use serde_json::Value;

use crate::error::ErrorCode;

/// Response envelope shared by all DSM calls
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    /// Whether the remote call succeeded
    #[serde(default)]
    pub success: bool,
    /// Endpoint-specific payload; some successful calls return none
    #[serde(default)]
    pub data: Option<Value>,
    /// Error object present on failed calls
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
}

/// Error object inside a failed response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Remote error code; DSM omits it on some failures
    #[serde(default)]
    pub code: Option<i64>,
}

impl ApiResponse {
    /// Remote error code of a failed response, `unknown` when the
    /// error object or its code field is absent
    pub fn error_code(&self) -> ErrorCode {
        ErrorCode(self.error.as_ref().and_then(|e| e.code))
    }
}

/// `data` payload of a successful login
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthData {
    /// Session identifier
    #[serde(default)]
    pub sid: Option<String>,
    /// Request-signing token
    #[serde(default)]
    pub synotoken: Option<String>,
}

/// One row of the task scheduler's `data.tasks` list
#[derive(Debug, Clone, Deserialize)]
pub struct RawTask {
    /// Scheduler task id
    pub id: i64,
    /// Task name
    pub name: String,
    /// Task type, e.g. `script`
    #[serde(rename = "type", default)]
    pub task_type: String,
    /// Owning user
    #[serde(default)]
    pub owner: String,
    /// Whether the task is enabled
    #[serde(default)]
    pub enable: bool,
    /// Whether the task can be triggered manually
    #[serde(default)]
    pub can_run: bool,
    /// Next scheduled trigger time, if any
    #[serde(default)]
    pub next_trigger_time: Option<String>,
}

/// `data` payload of the task scheduler list call
#[derive(Debug, Clone, Deserialize)]
pub struct TaskListData {
    /// Tasks in endpoint order
    #[serde(default)]
    pub tasks: Vec<RawTask>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_decodes_success_with_data() {
        let resp: ApiResponse =
            serde_json::from_value(json!({"success": true, "data": {"sid": "x"}})).unwrap();
        assert!(resp.success);
        assert!(resp.data.is_some());
        assert!(resp.error.is_none());
    }

    #[test]
    fn envelope_defaults_missing_fields() {
        let resp: ApiResponse = serde_json::from_value(json!({})).unwrap();
        assert!(!resp.success);
        assert!(resp.data.is_none());
        assert_eq!(resp.error_code().to_string(), "unknown");
    }

    #[test]
    fn error_code_read_from_error_object() {
        let resp: ApiResponse =
            serde_json::from_value(json!({"success": false, "error": {"code": 119}})).unwrap();
        assert_eq!(resp.error_code().0, Some(119));
    }

    #[test]
    fn raw_task_decodes_scheduler_row() {
        let task: RawTask = serde_json::from_value(json!({
            "id": 5,
            "name": "Daily Backup",
            "type": "script",
            "owner": "admin",
            "enable": true,
            "can_run": true,
            "next_trigger_time": "2026-08-25 03:00"
        }))
        .unwrap();
        assert_eq!(task.id, 5);
        assert_eq!(task.task_type, "script");
        assert!(task.enable);
    }
}
