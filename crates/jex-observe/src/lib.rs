mod logger;
pub use logger::{LogFormat, LogLevel, LoggerConfig, LoggerError, LoggerResult};

/// Initializes the global tracing subscriber from the given configuration.
///
/// Once installed, all `tracing` macros (`debug!`, `trace!`, ...) across the
/// workspace go through this subscriber. Initializing twice fails with
/// [`LoggerError::AlreadyInitialized`].
///
/// # Examples
/// ```rust
/// use jex_observe::{LoggerConfig, init_logger};
///
/// let config = LoggerConfig::default();
/// init_logger(&config).expect("failed to initialize logger");
/// tracing::info!("logger ready");
/// ```
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LogFormat::Text => logger::init_text(cfg),
        LogFormat::Json => logger::init_json(cfg),
        LogFormat::Journald => logger::init_journald(cfg),
    }
}
