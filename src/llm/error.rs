use thiserror::Error;

/// Failure of a single remote completion call
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Connection, TLS, timeout or body read failure
    #[error("Inference request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("Inference endpoint returned {status}: {body}")]
    Service { status: u16, body: String },

    /// Error event or undecodable chunk inside the response stream
    #[error("Inference stream error: {0}")]
    Stream(String),
}

impl InferenceError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, InferenceError::Transport(e) if e.is_timeout())
    }
}
