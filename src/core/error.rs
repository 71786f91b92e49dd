use thiserror::Error;

#[derive(Error, Debug)]
pub enum FiretopError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Async task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("Channel send error")]
    ChannelSend,

    #[error("Channel receive error")]
    ChannelReceive,
}

/// Result type alias for firetop operations
pub type Result<T> = std::result::Result<T, FiretopError>;

impl FiretopError {
    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a new invalid event error
    pub fn invalid_event<S: Into<String>>(msg: S) -> Self {
        Self::InvalidEvent(msg.into())
    }

    /// Returns true if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Validation(_) | Self::InvalidEvent(_) => true,
            Self::ChannelSend | Self::ChannelReceive => true,
            _ => false,
        }
    }

    /// Returns the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::Yaml(_) => "config",
            Self::Validation(_) => "validation",
            Self::InvalidEvent(_) => "event",
            Self::Io(_) => "io",
            Self::Join(_) => "async",
            Self::ChannelSend | Self::ChannelReceive => "channel",
        }
    }
}

impl From<crate::table::TableError> for FiretopError {
    fn from(err: crate::table::TableError) -> Self {
        Self::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = FiretopError::config("bad window");
        assert_eq!(err.to_string(), "Configuration error: bad window");
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_error_recoverability() {
        assert!(FiretopError::validation("bad regex").is_recoverable());
        assert!(!FiretopError::config("invalid config").is_recoverable());
        assert!(FiretopError::ChannelSend.is_recoverable());
    }

    #[test]
    fn test_table_error_becomes_validation() {
        let err: FiretopError = crate::table::TableError::UnknownColumn("cpu".to_string()).into();
        assert_eq!(err.category(), "validation");
        assert!(err.to_string().contains("cpu"));
    }

    #[tokio::test]
    async fn test_aborted_task_is_join_error() {
        async fn join(handle: tokio::task::JoinHandle<()>) -> Result<()> {
            handle.await?;
            Ok(())
        }
        let handle = tokio::spawn(std::future::pending::<()>());
        handle.abort();
        let err = join(handle).await.unwrap_err();
        assert!(matches!(err, FiretopError::Join(_)));
        assert_eq!(err.category(), "async");
    }
}
