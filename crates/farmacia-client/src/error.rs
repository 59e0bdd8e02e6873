use thiserror::Error;

/// Errors returned by the pharmacy API client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("unexpected HTTP status {status} from {url}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    UnexpectedStatus {
        status: u16,
        url: String,
        message: Option<String>,
    },

    /// The body did not match the shape the endpoint promises.
    #[error("invalid response for {context}: {reason}")]
    InvalidResponse { context: String, reason: String },

    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

/// Errors from a favorites persistence backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
