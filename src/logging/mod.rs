//! Логирование через `tracing`.
//!
//! Кодек сам только пишет события (`debug!`, `trace!`, `warn!`). Установить
//! глобальный subscriber может приложение, встраивающее кодек, через
//! [`init_logging`].

pub mod config;
mod filters;
mod formatter;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use config::{LogFormat, LoggingConfig};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter directive '{directive}': {reason}")]
    InvalidDirective { directive: String, reason: String },
}

/// Устанавливает глобальный subscriber.
///
/// Возвращает `Ok(false)`, если subscriber уже был установлен (повторный
/// вызов ничего не меняет).
pub fn init_logging(config: &LoggingConfig) -> Result<bool, LoggingError> {
    let env_filter = filters::build_filter_from_config(config)?;
    let formatter = formatter::build_formatter_from_config(config);

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(formatter)
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            level = %config.level,
            format = %config.format,
            "Logging initialized"
        );
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_init_logging_is_idempotent() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig::default();
        // первый вызов мог уже случиться в другом тесте этого процесса
        init_logging(&config).unwrap();
        assert!(!init_logging(&config).unwrap());
    }
}
