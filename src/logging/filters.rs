use tracing_subscriber::EnvFilter;

use super::{config::LoggingConfig, LoggingError};

/// Фильтр из конфигурации. Заданный `RUST_LOG` имеет приоритет.
pub fn build_filter_from_config(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(env_filter) = EnvFilter::try_from_default_env() {
        return Ok(env_filter);
    }

    let directive = config.build_filter_directive();
    EnvFilter::try_new(&directive).map_err(|e| LoggingError::InvalidDirective {
        directive,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_filter_from_config() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig {
            level: "debug".into(),
            ..Default::default()
        };
        let filter = build_filter_from_config(&config).unwrap();
        assert!(filter.to_string().contains("debug"));
    }

    #[test]
    #[serial]
    fn test_invalid_directive() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig {
            level: "info".into(),
            directives: vec!["zpack=loudest".into()],
            ..Default::default()
        };
        assert!(matches!(
            build_filter_from_config(&config),
            Err(LoggingError::InvalidDirective { .. })
        ));
    }
}
