//! Error types for the stream and query layers.

use thiserror::Error;

/// Errors generated inside the streaming layer.
///
/// These never escape the reconnect loop; consumers only observe
/// [`ConnectionState`](crate::stream::ConnectionState) transitions.
#[derive(Debug, Clone, Error)]
pub enum StreamError {
    #[error("http request failed: {0}")]
    Http(String),

    #[error("unexpected http status: {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Errors returned by the request/response API client.
///
/// Propagated one level to the immediate caller; there is no automatic
/// retry. `Display` yields a single human-readable message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("api request failed: {0}")]
    Http(String),

    #[error("api error: {0}")]
    Status(reqwest::StatusCode),

    #[error("api response decode failed: {0}")]
    Decode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_messages_are_human_readable() {
        let err = ApiError::Status(reqwest::StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "api error: 404 Not Found");

        let err = ApiError::Http("connection refused".to_string());
        assert_eq!(err.to_string(), "api request failed: connection refused");
    }

    #[test]
    fn test_stream_error_messages() {
        let err = StreamError::Status(502);
        assert_eq!(err.to_string(), "unexpected http status: 502");
    }
}
