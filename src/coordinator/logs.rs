//! Backup log entries and task correlation
//!
//! DSM log events carry the task name inside bracket pairs, e.g.
//! `[Network][Daily Backup] Backup integrity check is finished.`; the
//! correlator matches on the `][<name>]` form so a task whose name is a
//! substring of another task's name never matches the wrong entry.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fixed textual timestamp format of DSM backup log entries
pub const LOG_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// One entry of the backup log window
///
/// `extra` keeps any additional payload fields so a correlated entry can
/// be merged onto a task record without losing information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Timestamp in [`LOG_TIME_FORMAT`]
    #[serde(default)]
    pub time: String,
    /// Free-text event description
    #[serde(default)]
    pub event: String,
    /// Remaining fields of the raw entry
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LogEntry {
    /// Parse the entry timestamp; `None` when it does not match the
    /// fixed format
    pub fn parsed_time(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.time, LOG_TIME_FORMAT).ok()
    }
}

/// Most recent log entry for the given task
///
/// Pure function over the input slice. Entries match when their event
/// text contains `][<task_name>]`; entries whose timestamp fails to
/// parse are silently skipped. Among matches the maximal timestamp
/// wins; on a tie the earliest entry in input order is kept. `None`
/// when nothing matches.
pub fn latest_log_for_task<'a>(entries: &'a [LogEntry], task_name: &str) -> Option<&'a LogEntry> {
    let needle = format!("][{}]", task_name);
    let mut best: Option<(NaiveDateTime, &LogEntry)> = None;
    for entry in entries {
        if !entry.event.contains(&needle) {
            continue;
        }
        let Some(when) = entry.parsed_time() else {
            continue;
        };
        match best {
            Some((best_when, _)) if best_when >= when => {}
            _ => best = Some((when, entry)),
        }
    }
    best.map(|(_, entry)| entry)
}
