mod config;
mod error;
mod level;
mod log;

pub use config::{LogFormat, LoggerConfig};
pub use error::{LoggerError, LoggerResult};
pub use level::LogLevel;

pub(crate) use log::{init_journald, init_json, init_text};
