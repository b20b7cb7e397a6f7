use thiserror::Error;

/// Shown when the chat endpoint answers with a non-2xx status.
pub const SERVER_ERROR_TEXT: &str = "Sorry, I encountered an error. Please try again.";

/// Shown when the request never completes or the reply can't be read.
pub const NETWORK_ERROR_TEXT: &str = "Network error. Please check your connection and try again.";

#[derive(Debug, Error)]
pub enum ChatError {
    /// The endpoint answered, but with a non-2xx status. The body is ignored.
    #[error("chat endpoint returned HTTP {status}")]
    Server { status: u16 },

    /// Transport failure, timeout, or a response body that isn't the expected JSON.
    #[error("network error: {0}")]
    Network(String),
}

impl ChatError {
    /// The fixed text rendered in place of a reply.
    pub fn user_message(&self) -> &'static str {
        match self {
            ChatError::Server { .. } => SERVER_ERROR_TEXT,
            ChatError::Network(_) => NETWORK_ERROR_TEXT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_text() {
        let err = ChatError::Server { status: 500 };
        assert_eq!(err.user_message(), SERVER_ERROR_TEXT);
        assert_eq!(err.to_string(), "chat endpoint returned HTTP 500");
    }

    #[test]
    fn test_network_error_text() {
        let err = ChatError::Network("connection refused".to_string());
        assert_eq!(err.user_message(), NETWORK_ERROR_TEXT);
    }
}
