use thiserror::Error;

/// Errors that abort a scrape or prevent the exporter from starting.
///
/// Cell-level decode problems are not represented here; those are
/// [`FieldError`](crate::decode::FieldError)s and never abort anything.
#[derive(Error, Debug)]
pub enum AppError {
    /// Modem answered with a non-2xx status, or the body could not be read.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error (refused, reset, DNS).
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The modem rejected the credentials.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The modem answered the login in a way the state machine does not know.
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Exporter configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl AppError {
    /// Short stable name of the error class, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::HttpError(_) | AppError::Timeout(_) | AppError::NetworkError(_) => {
                "transport"
            }
            AppError::AuthenticationFailed(_) => "authentication",
            AppError::ProtocolError(_) => "protocol",
            AppError::ConfigError(_) => "config",
            AppError::Generic(_) => "generic",
        }
    }

    /// Returns true for connection-level failures (as opposed to the modem
    /// answering but refusing us).
    pub fn is_transport(&self) -> bool {
        self.kind() == "transport"
    }
}
