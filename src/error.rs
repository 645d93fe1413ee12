//! Error types for the DSM task monitor
//!
//! Three layers: `DsmError` classifies a single API call, `RefreshError`
//! wraps anything that aborts a coordinator refresh cycle, and
//! `TaskRunError` wraps a failed run-task invocation together with the
//! task name for diagnostics.

use std::fmt;

use thiserror::Error;

/// DSM error codes that mean the current session is no longer valid.
///
/// 105: insufficient privilege, 106: session timeout, 107: session
/// interrupted by a duplicate login, 119: SID not found.
const SESSION_EXPIRED_CODES: [i64; 4] = [105, 106, 107, 119];

/// Remote error code taken from a DSM `error.code` field.
///
/// DSM omits the field on some failures; `None` displays as the
/// `unknown` sentinel rather than being treated as a distinct error
/// kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCode(pub Option<i64>);

impl ErrorCode {
    /// Sentinel for responses with no `error.code` field
    pub const UNKNOWN: ErrorCode = ErrorCode(None);

    /// Whether this code means the session has expired and the client
    /// must log in again before the next request
    pub fn is_session_expired(&self) -> bool {
        matches!(self.0, Some(code) if SESSION_EXPIRED_CODES.contains(&code))
    }
}

impl From<Option<i64>> for ErrorCode {
    fn from(code: Option<i64>) -> Self {
        ErrorCode(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(code) => write!(f, "{}", code),
            None => write!(f, "unknown"),
        }
    }
}

/// Classification of a single DSM API call
#[derive(Error, Debug)]
pub enum DsmError {
    /// Connection failure or a response body that could not be decoded
    /// as JSON
    #[error("transport error talking to DSM: {0}")]
    Transport(#[from] reqwest::Error),

    /// Well-formed response with `success: false`
    #[error("DSM API error (code {0})")]
    Api(ErrorCode),

    /// Login failed; the session is left unauthenticated
    #[error("DSM login failed (code {0})")]
    Auth(ErrorCode),
}

impl DsmError {
    /// Remote error code carried by this error, if any
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            DsmError::Api(code) | DsmError::Auth(code) => Some(*code),
            DsmError::Transport(_) => None,
        }
    }
}

/// Failure of one coordinator refresh cycle
///
/// A refresh cycle is atomic: any of these aborts the whole cycle and no
/// partial record list is produced. The poll driver keeps the previous
/// snapshot.
#[derive(Error, Debug)]
pub enum RefreshError {
    /// A DSM request inside the cycle failed
    #[error("DSM request failed during refresh: {0}")]
    Request(#[from] DsmError),

    /// A response was missing an expected field or had the wrong shape
    #[error("unexpected DSM response shape: {0}")]
    Shape(String),
}

/// Failure of a run-task invocation, carrying the task name
#[derive(Error, Debug)]
#[error("failed to run task \"{task}\": {source}")]
pub struct TaskRunError {
    /// Name of the scheduler task that was asked to run
    pub task: String,
    /// Underlying API call failure
    #[source]
    pub source: DsmError,
}
