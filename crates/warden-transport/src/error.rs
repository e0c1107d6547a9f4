/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server could not be reached (DNS, refused, reset, TLS...).
    #[error("unable to reach the server: {0}")]
    Network(String),

    /// No response arrived in time.
    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-2xx status.
    ///
    /// The raw body is kept so upper layers can pull a `message` out of it.
    #[error("request failed with status {status}")]
    Status { status: u16, body: Vec<u8> },

    /// The request could not be built (bad URL, client construction).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Returns the HTTP status for [`TransportError::Status`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the response body for [`TransportError::Status`].
    pub fn body(&self) -> Option<&[u8]> {
        match self {
            Self::Status { body, .. } => Some(body),
            _ => None,
        }
    }
}
