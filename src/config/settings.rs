use std::path::Path;

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use super::codec::{
    DecoderConfig, EncoderConfig, DEFAULT_BUFFER_SIZE, DEFAULT_MAX_DEPTH,
    DEFAULT_RESERVED_MAP_CAPACITY,
};
use crate::logging::LoggingConfig;

/// Настройки кодека и логирования.
///
/// Источники в порядке приоритета: переменные окружения `ZPACK_*`
/// (вложенность через `__`, например `ZPACK_ENCODER__BUFFER_SIZE`), файл
/// (только для [`Settings::load_from_file`]), значения по умолчанию.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub encoder: EncoderConfig,
    pub decoder: DecoderConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::with_env(Self::defaults()?).build()?.try_deserialize()
    }

    /// Формат файла определяется по расширению (toml, json, yaml, ...).
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let builder = Self::defaults()?.add_source(File::from(path.as_ref()));
        Self::with_env(builder).build()?.try_deserialize()
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("encoder.buffer_size", DEFAULT_BUFFER_SIZE as u64)?
            .set_default("encoder.max_depth", DEFAULT_MAX_DEPTH as u64)?
            .set_default(
                "decoder.reserved_map_capacity",
                DEFAULT_RESERVED_MAP_CAPACITY as u64,
            )?
            .set_default("decoder.max_depth", DEFAULT_MAX_DEPTH as u64)?
            .set_default("logging.level", "info")
    }

    fn with_env(builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        builder.add_source(
            Environment::with_prefix("ZPACK")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::{env, io::Write};

    use serial_test::serial;

    use super::*;
    use crate::logging::LogFormat;

    fn clear_env() {
        for key in [
            "ZPACK_ENCODER__BUFFER_SIZE",
            "ZPACK_ENCODER__MAX_DEPTH",
            "ZPACK_DECODER__MAX_DEPTH",
            "ZPACK_LOGGING__LEVEL",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_load_defaults() {
        clear_env();
        let settings = Settings::load().unwrap();
        assert_eq!(settings.encoder, EncoderConfig::default());
        assert_eq!(settings.decoder.reserved_map_capacity, 256_000);
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        env::set_var("ZPACK_ENCODER__BUFFER_SIZE", "4096");
        env::set_var("ZPACK_DECODER__MAX_DEPTH", "64");

        let settings = Settings::load().unwrap();
        clear_env();

        assert_eq!(settings.encoder.buffer_size, 4096);
        assert_eq!(settings.encoder.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(settings.decoder.max_depth, 64);
    }

    #[test]
    #[serial]
    fn test_load_from_file_with_env_on_top() {
        clear_env();
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[encoder]\nbuffer_size = 1024\n\n[logging]\nlevel = \"debug\"\nformat = \"json\""
        )
        .unwrap();

        env::set_var("ZPACK_LOGGING__LEVEL", "warn");
        let settings = Settings::load_from_file(file.path()).unwrap();
        clear_env();

        assert_eq!(settings.encoder.buffer_size, 1024);
        assert_eq!(settings.logging.level, "warn");
        assert_eq!(settings.logging.format, LogFormat::Json);
    }

    #[test]
    #[serial]
    fn test_missing_file_is_error() {
        clear_env();
        assert!(Settings::load_from_file("/nonexistent/zpack.toml").is_err());
    }
}
