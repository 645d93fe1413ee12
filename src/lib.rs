//! DSM Task Monitor Library
//!
//! Polls a DSM device's task-scheduling and backup subsystems over its
//! authenticated web API, fuses the payloads into unified per-task
//! records, and exposes them plus a run-task command. The main binary
//! is in `src/main.rs`.

pub mod config;
pub mod coordinator;
pub mod dsm;
pub mod error;
pub mod poller;
