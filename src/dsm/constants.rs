//! DSM API constants
//!
//! Endpoint names, versions, and parameter/payload keys for the DSM web
//! API. Everything goes through one endpoint path; calls are selected by
//! the `api`/`version`/`method` query parameters.

/// Single web API endpoint path on the DSM host
pub const WEBAPI_ENDPOINT: &str = "/webapi/entry.cgi";

/// Authentication capability
pub const API_AUTH: &str = "SYNO.API.Auth";
/// Authentication API version
pub const API_AUTH_VERSION: &str = "7";
/// Login method
pub const METHOD_LOGIN: &str = "login";
/// Login parameter requesting a signing token in the response
pub const PARAM_ENABLE_SYNO_TOKEN: &str = "enable_syno_token";
/// Login account parameter
pub const PARAM_ACCOUNT: &str = "account";
/// Login password parameter
pub const PARAM_PASSWD: &str = "passwd";
/// Affirmative parameter value
pub const VALUE_YES: &str = "yes";

/// Reserved signing-token parameter attached to every non-login call
pub const PARAM_SYNO_TOKEN: &str = "SynoToken";

/// Task scheduler capability
pub const API_TASK_SCHEDULER: &str = "SYNO.Core.TaskScheduler";
/// Task scheduler API version
pub const API_TASK_SCHEDULER_VERSION: &str = "3";
/// List method (task scheduler and backup logs)
pub const METHOD_LIST: &str = "list";
/// Task list sort field
pub const TASK_SORT_BY: &str = "name";
/// Task list sort direction
pub const TASK_SORT_DIRECTION: &str = "asc";
/// Task list page size
pub const TASK_LIMIT: &str = "50";
/// Task list page offset
pub const TASK_OFFSET: &str = "0";

/// Event scheduler capability (runs a task by name)
pub const API_EVENT_SCHEDULER: &str = "SYNO.Core.EventScheduler";
/// Event scheduler API version
pub const API_EVENT_SCHEDULER_VERSION: &str = "1";
/// Run method
pub const METHOD_RUN: &str = "run";
/// Run-task name parameter
pub const PARAM_TASK_NAME: &str = "task_name";

/// Compound-request envelope capability (alternate run-task shape)
pub const API_ENTRY_REQUEST: &str = "SYNO.Entry.Request";
/// Compound-request envelope version
pub const API_ENTRY_REQUEST_VERSION: &str = "1";
/// Compound-request method
pub const METHOD_REQUEST: &str = "request";
/// Parameter carrying the JSON-encoded inner calls
pub const PARAM_COMPOUND: &str = "compound";

/// Hyper Backup task capability
pub const API_BACKUP_TASK: &str = "SYNO.Backup.Task";
/// Hyper Backup task API version
pub const API_BACKUP_TASK_VERSION: &str = "1";
/// Last-run result method
pub const METHOD_RESULT: &str = "result";
/// Live status method
pub const METHOD_STATUS: &str = "status";
/// Backup task id parameter
pub const PARAM_TASK_ID: &str = "task_id";

/// Hyper Backup log capability
pub const API_BACKUP_LOG: &str = "SYNO.Backup.Log";
/// Hyper Backup log API version
pub const API_BACKUP_LOG_VERSION: &str = "1";
/// Server-side event text filter parameter
pub const PARAM_FILTER_KEYWORD: &str = "filter_keyword";
/// Log window page size
pub const LOG_LIMIT: &str = "1000";
/// Log window page offset
pub const LOG_OFFSET: &str = "0";

/// Server-side filter selecting the informational integrity-check events
pub const INTEGRITY_CHECK_EVENT: &str =
    "Backup integrity check is finished. No error was found.";

/// Response envelope key holding the payload
pub const DATA_KEY: &str = "data";
/// Log window payload key
pub const LOG_LIST_KEY: &str = "log_list";
/// Status payload key holding the progress sub-object
pub const PROGRESS_KEY: &str = "progress";
