//! Встроенные пользовательские типы реестра по умолчанию.
//!
//! - `RegExp` (код 0): шаблон регулярного выражения, аргументы `[source, flags]`;
//! - `Date` (код 1): момент времени в миллисекундах эпохи, аргументы `[millis]`.

use std::any::Any;

use chrono::{DateTime, Utc};
use zpack_error::{RegistryError, ZpackResult};

use super::value::{CustomValue, Value};

pub const PATTERN_TYPE: &str = "RegExp";
pub const PATTERN_CODE: u64 = 0;
pub const TIMESTAMP_TYPE: &str = "Date";
pub const TIMESTAMP_CODE: u64 = 1;

/// Допустимые флаги в каноническом порядке.
const PATTERN_FLAGS: &str = "dgimsuvy";

/// Источник пустого шаблона.
const EMPTY_PATTERN_SOURCE: &str = "(?:)";

/// Граница допустимого момента времени: ±10^8 суток от эпохи.
const MAX_TIME_MILLIS: f64 = 8.64e15;

fn invalid_args(
    type_name: &str,
    reason: impl Into<String>,
) -> RegistryError {
    RegistryError::InvalidArgs {
        type_name: type_name.to_string(),
        reason: reason.into(),
    }
}

/// Шаблон регулярного выражения.
///
/// Шаблон не компилируется: кодек переносит только исходный текст и флаги.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    source: String,
    flags: String,
}

impl Pattern {
    /// Создаёт шаблон. Флаги проверяются и приводятся к каноническому порядку,
    /// пустой источник заменяется на `(?:)`.
    pub fn new(
        source: impl Into<String>,
        flags: &str,
    ) -> ZpackResult<Self> {
        let mut source = source.into();
        if source.is_empty() {
            source = EMPTY_PATTERN_SOURCE.to_string();
        }
        Ok(Self {
            source,
            flags: canonical_flags(flags)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn has_flag(
        &self,
        flag: char,
    ) -> bool {
        self.flags.contains(flag)
    }
}

impl CustomValue for Pattern {
    fn type_name(&self) -> &str {
        PATTERN_TYPE
    }

    fn to_args(&self) -> Vec<Value> {
        vec![
            Value::Str(self.source.clone()),
            Value::Str(self.flags.clone()),
        ]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn canonical_flags(flags: &str) -> ZpackResult<String> {
    let mut seen = [false; PATTERN_FLAGS.len()];
    for flag in flags.chars() {
        let idx = PATTERN_FLAGS
            .find(flag)
            .ok_or_else(|| invalid_args(PATTERN_TYPE, format!("unknown flag '{flag}'")))?;
        if seen[idx] {
            return Err(invalid_args(PATTERN_TYPE, format!("duplicate flag '{flag}'")).into());
        }
        seen[idx] = true;
    }

    let unicode = PATTERN_FLAGS.find('u').is_some_and(|i| seen[i]);
    let unicode_sets = PATTERN_FLAGS.find('v').is_some_and(|i| seen[i]);
    if unicode && unicode_sets {
        return Err(invalid_args(PATTERN_TYPE, "flags 'u' and 'v' are mutually exclusive").into());
    }

    Ok(PATTERN_FLAGS
        .chars()
        .zip(seen)
        .filter_map(|(flag, on)| on.then_some(flag))
        .collect())
}

/// Builder типа `RegExp`: `[source, flags?]`.
///
/// Первым аргументом может быть другой шаблон; без явных флагов тогда
/// сохраняются его флаги.
pub fn build_pattern(args: Vec<Value>) -> ZpackResult<Value> {
    let mut args = args.into_iter();
    let source = args.next().unwrap_or(Value::Undefined);
    let flags = args.next().unwrap_or(Value::Undefined);

    let (source, inherited) = match &source {
        Value::Str(s) => (s.clone(), None),
        Value::Undefined => (String::new(), None),
        other => match other.as_custom::<Pattern>() {
            Some(p) => (p.source.clone(), Some(p.flags.clone())),
            None => {
                return Err(invalid_args(
                    PATTERN_TYPE,
                    format!("source must be a string, got {}", other.type_name()),
                )
                .into())
            }
        },
    };

    let flags = match flags {
        Value::Str(s) => s,
        Value::Undefined => inherited.unwrap_or_default(),
        other => {
            return Err(invalid_args(
                PATTERN_TYPE,
                format!("flags must be a string, got {}", other.type_name()),
            )
            .into())
        }
    };

    Ok(Value::custom(Pattern::new(source, &flags)?))
}

/// Момент времени с точностью до миллисекунды.
///
/// Невалидный момент хранится как `NaN` миллисекунд и переносится кодеком
/// без изменений.
#[derive(Debug, Clone, Copy)]
pub struct Timestamp {
    millis: f64,
}

impl Timestamp {
    /// Значение вне диапазона ±8.64e15 мс или не конечное даёт невалидный
    /// момент. Дробная часть отбрасывается.
    pub fn from_millis(millis: f64) -> Self {
        if !millis.is_finite() || millis.abs() > MAX_TIME_MILLIS {
            return Self::invalid();
        }
        // + 0.0 превращает -0 в +0
        Self {
            millis: millis.trunc() + 0.0,
        }
    }

    pub fn invalid() -> Self {
        Self { millis: f64::NAN }
    }

    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self::from_millis(dt.timestamp_millis() as f64)
    }

    /// Разбирает строку RFC 3339. Неразборчивая строка даёт невалидный момент.
    pub fn parse(s: &str) -> Self {
        DateTime::parse_from_rfc3339(s.trim())
            .map(|dt| Self::from_datetime(dt.with_timezone(&Utc)))
            .unwrap_or_else(|_| Self::invalid())
    }

    pub fn millis(&self) -> f64 {
        self.millis
    }

    pub fn is_valid(&self) -> bool {
        !self.millis.is_nan()
    }

    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        if !self.is_valid() {
            return None;
        }
        DateTime::from_timestamp_millis(self.millis as i64)
    }
}

impl PartialEq for Timestamp {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.millis == other.millis || (self.millis.is_nan() && other.millis.is_nan())
    }
}

impl CustomValue for Timestamp {
    fn type_name(&self) -> &str {
        TIMESTAMP_TYPE
    }

    fn to_args(&self) -> Vec<Value> {
        vec![Value::Number(self.millis)]
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Builder типа `Date`: `[millis | rfc3339 | Date]`.
///
/// Отсутствующий аргумент даёт невалидный момент, `null` даёт эпоху.
pub fn build_timestamp(args: Vec<Value>) -> ZpackResult<Value> {
    let ts = match args.into_iter().next().unwrap_or(Value::Undefined) {
        Value::Number(ms) => Timestamp::from_millis(ms),
        Value::Str(s) => Timestamp::parse(&s),
        Value::Undefined => Timestamp::invalid(),
        Value::Null => Timestamp::from_millis(0.0),
        other => match other.as_custom::<Timestamp>() {
            Some(ts) => *ts,
            None => {
                return Err(invalid_args(
                    TIMESTAMP_TYPE,
                    format!("cannot build a date from {}", other.type_name()),
                )
                .into())
            }
        },
    };
    Ok(Value::custom(ts))
}
