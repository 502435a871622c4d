//! Classification of HTTP status failures into user-facing messages.

use reqwest::StatusCode;

/// An HTTP request that completed with an error status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpStatusError {
    /// HTTP 429, or 403 with the request quota exhausted
    RateLimitExceeded,
    /// HTTP 404
    NotFound,
    /// HTTP 401 or 403
    Forbidden(u16),
    /// Any other 4xx
    ClientError(u16),
    /// Any 5xx
    ServerError(u16),
}

impl std::fmt::Display for HttpStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HttpStatusError::RateLimitExceeded => {
                write!(f, "GitHub API rate limit exceeded. Try again later.")
            }
            HttpStatusError::NotFound => {
                write!(f, "The requested resource was not found (HTTP 404)")
            }
            HttpStatusError::Forbidden(code) => {
                write!(f, "Access to this resource is forbidden (HTTP {})", code)
            }
            HttpStatusError::ClientError(code) => write!(f, "Request rejected (HTTP {})", code),
            HttpStatusError::ServerError(code) => {
                write!(f, "Server error (HTTP {}). The service may be down.", code)
            }
        }
    }
}

impl std::error::Error for HttpStatusError {}

/// Header GitHub uses to report the remaining request quota.
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Classifies an error status. `quota_exhausted` distinguishes a rate-limited 403.
pub fn classify_status(status: StatusCode, quota_exhausted: bool) -> Option<HttpStatusError> {
    match status {
        StatusCode::TOO_MANY_REQUESTS => Some(HttpStatusError::RateLimitExceeded),
        StatusCode::FORBIDDEN if quota_exhausted => Some(HttpStatusError::RateLimitExceeded),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Some(HttpStatusError::Forbidden(status.as_u16()))
        }
        StatusCode::NOT_FOUND => Some(HttpStatusError::NotFound),
        s if s.is_client_error() => Some(HttpStatusError::ClientError(s.as_u16())),
        s if s.is_server_error() => Some(HttpStatusError::ServerError(s.as_u16())),
        _ => None,
    }
}

/// Passes successful responses through and turns error statuses into a
/// readable [`HttpStatusError`].
pub fn check_status(response: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    let status = response.status();
    let quota_exhausted = response
        .headers()
        .get(RATE_LIMIT_REMAINING)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim() == "0");

    match response.error_for_status() {
        Ok(response) => Ok(response),
        Err(error) => match classify_status(status, quota_exhausted) {
            Some(status_error) => Err(anyhow::Error::from(status_error)),
            None => Err(anyhow::Error::from(error)),
        },
    }
}
