//! HTTP client module with timeouts and status classification.

mod client;
mod status;

pub use client::{
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT, DEFAULT_STALL_TIMEOUT, DownloadOutcome,
    HttpClient,
};
pub use status::{HttpStatusError, check_status, classify_status};
