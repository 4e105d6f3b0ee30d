use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Trade endpoint transport error: {0}")]
    Transport(String),

    #[error("Trade endpoint returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Trade endpoint protocol error: {0}")]
    Protocol(String),

    #[error("Trade status request rejected: {0}")]
    Rejected(String),

    #[error("Invalid session configuration: {0}")]
    InvalidConfig(String),
}

impl SessionError {
    /// The request never produced a usable HTTP response.
    pub fn is_transport(&self) -> bool {
        matches!(self, SessionError::Transport(_) | SessionError::Http { .. })
    }

    /// A response arrived but could not be interpreted.
    pub fn is_protocol(&self) -> bool {
        matches!(self, SessionError::Protocol(_))
    }
}

impl From<reqwest::Error> for SessionError {
    fn from(error: reqwest::Error) -> Self {
        SessionError::Transport(error.to_string())
    }
}
