use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Формат вывода логов.
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Многострочный вывод для локальной отладки
    Pretty,
    /// Одна строка на событие
    #[default]
    Compact,
    /// JSON для сборщиков логов
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let s = match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        };
        f.write_str(s)
    }
}

/// Настройки логирования.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Уровень по умолчанию: trace, debug, info, warn, error
    pub level: String,
    pub format: LogFormat,
    /// Дополнительные директивы `EnvFilter`, например `zpack::codec=trace`
    pub directives: Vec<String>,
    pub with_ansi: bool,
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            directives: Vec::new(),
            with_ansi: true,
            with_target: true,
        }
    }
}

impl LoggingConfig {
    /// Директива фильтра: уровень по умолчанию плюс явные директивы.
    pub fn build_filter_directive(&self) -> String {
        std::iter::once(self.level.as_str())
            .chain(self.directives.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
        assert_eq!(LogFormat::Compact.to_string(), "compact");
    }

    #[test]
    fn test_filter_directive() {
        let config = LoggingConfig {
            level: "warn".into(),
            directives: vec!["zpack::codec=trace".into()],
            ..Default::default()
        };
        assert_eq!(config.build_filter_directive(), "warn,zpack::codec=trace");
        assert_eq!(LoggingConfig::default().build_filter_directive(), "info");
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: LoggingConfig = serde_json::from_str(r#"{"format": "json"}"#).unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, "info");
    }
}
