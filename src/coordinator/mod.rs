//! Polling coordinator
//!
//! One refresh cycle fetches the scheduler task list, the backup log
//! window, and per-task result/status payloads, then fuses everything
//! into composite [`TaskRecord`]s. A cycle is atomic: any failure
//! aborts it and no partial record list is ever returned. The driver
//! keeps the previous snapshot on failure.

pub mod logs;
pub mod overrides;
pub mod record;

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::dsm::client::DsmClient;
use crate::dsm::constants::{LOG_LIST_KEY, PROGRESS_KEY};
use crate::dsm::models::TaskListData;
use crate::error::RefreshError;
use self::logs::{latest_log_for_task, LogEntry};
use self::record::{
    TaskRecord, PREFIX_INTEGRITY_CHECK, PREFIX_LAST_RESULT, PREFIX_STATUS, PREFIX_STATUS_PROGRESS,
};

/// Builds the unified per-task records for one DSM device
#[derive(Debug)]
pub struct TaskCoordinator {
    client: Arc<DsmClient>,
    // Serializes cycles: only one refresh may be in flight, later
    // callers wait for the running one to finish.
    cycle_gate: Mutex<()>,
}

impl TaskCoordinator {
    /// Create a coordinator over the given client
    pub fn new(client: Arc<DsmClient>) -> Self {
        Self {
            client,
            cycle_gate: Mutex::new(()),
        }
    }

    /// The client this coordinator polls through
    pub fn client(&self) -> &Arc<DsmClient> {
        &self.client
    }

    /// Run one refresh cycle and return the full merged record list
    pub async fn refresh(&self) -> Result<Vec<TaskRecord>, RefreshError> {
        let _in_flight = self.cycle_gate.lock().await;
        self.run_cycle().await
    }

    async fn run_cycle(&self) -> Result<Vec<TaskRecord>, RefreshError> {
        let list = self.client.task_list().await?;
        let data = list
            .data
            .ok_or_else(|| RefreshError::Shape("task list response has no data field".into()))?;
        let task_list: TaskListData = serde_json::from_value(data)
            .map_err(|err| RefreshError::Shape(format!("task list payload: {err}")))?;

        let log_entries = self.fetch_log_window().await?;
        debug!(
            tasks = task_list.tasks.len(),
            logs = log_entries.len(),
            "starting merge pass"
        );

        let mut records = Vec::with_capacity(task_list.tasks.len());
        // Endpoint order is preserved; no re-sort.
        for raw in task_list.tasks {
            let mut rec = TaskRecord::from(raw);
            let latest_check = latest_log_for_task(&log_entries, &rec.name).cloned();

            let result = self.client.backup_task_result(rec.id).await?;
            let status = self.client.backup_task_status(rec.id).await?;
            let status_data = status.data.unwrap_or(Value::Null);

            if let Some(result_data) = result.data.as_ref() {
                rec.merge_with_prefix(result_data, PREFIX_LAST_RESULT);
            }
            rec.merge_with_prefix(&status_data, PREFIX_STATUS);
            if let Some(progress) = status_data.get(PROGRESS_KEY) {
                rec.merge_with_prefix(progress, PREFIX_STATUS_PROGRESS);
            }
            if let Some(entry) = latest_check {
                if let Ok(payload) = serde_json::to_value(&entry) {
                    rec.merge_with_prefix(&payload, PREFIX_INTEGRITY_CHECK);
                }
            }

            records.push(rec);
        }

        Ok(records)
    }

    /// Fetch the bounded window of recent integrity-check log entries
    ///
    /// A response without a log list is treated as an empty stream, not
    /// an error.
    async fn fetch_log_window(&self) -> Result<Vec<LogEntry>, RefreshError> {
        let response = self.client.backup_logs().await?;
        let entries = response
            .data
            .as_ref()
            .and_then(|data| data.get(LOG_LIST_KEY))
            .cloned()
            .map(serde_json::from_value::<Vec<LogEntry>>)
            .transpose()
            .map_err(|err| RefreshError::Shape(format!("log list payload: {err}")))?
            .unwrap_or_default();
        Ok(entries)
    }
}
