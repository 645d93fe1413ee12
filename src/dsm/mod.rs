//! DSM web API client
//!
//! Session lifecycle, request signing, and result classification for
//! the proprietary JSON-over-HTTP API of a DSM device.

pub mod client;
pub mod constants;
pub mod models;
pub mod session;

pub use client::DsmClient;
pub use session::{Credentials, Session};
