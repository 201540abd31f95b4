use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("invalid log level filter: {0}")]
    InvalidLevel(String),

    #[error("logger already initialized")]
    AlreadyInitialized,

    #[error("journald is not supported on this platform")]
    JournaldNotSupported,

    #[error("failed to initialize journald: {0}")]
    JournaldInitFailed(String),
}

pub type LoggerResult<T> = Result<T, LoggerError>;
