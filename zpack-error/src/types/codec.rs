use std::any::Any;

use crate::{ErrorExt, StatusCode};

/// Ошибка кодирования значения.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// Тип значения не является контейнером/бинарным блоком и не найден в
    /// реестре пользовательских типов
    UnsupportedType { type_name: String },
    /// Код зарегистрированного типа не помещается в 4-байтовое поле
    ConstructorCodeTooLarge { type_name: String, code: u64 },
    /// Буфер не может вырасти до требуемого размера
    OutOfMemory { requested: Option<usize>, capacity: usize },
    /// Широкое целое вне диапазона 64-битного поля
    WideIntOutOfRange { value: i128 },
    /// Превышен лимит глубины вложенности
    DepthLimit { current: usize, max: usize },
}

/// Ошибка декодирования потока.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Код `constructorN` отсутствует в реестре декодера
    UnknownConstructorCode { code: u32 },
    /// Неожиданный конец данных
    UnexpectedEof {
        context: String,
        offset: usize,
        needed: usize,
    },
    /// Аргументы пользовательского типа закодированы не массивом
    InvalidCustomArgs { code: u32, found: String },
    /// Превышен лимит глубины вложенности
    DepthLimit { current: usize, max: usize },
}

impl ErrorExt for EncodeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedType { .. } => StatusCode::UnsupportedType,
            Self::ConstructorCodeTooLarge { .. } => StatusCode::ConstructorCodeTooLarge,
            Self::OutOfMemory { .. } => StatusCode::OutOfMemory,
            Self::WideIntOutOfRange { .. } => StatusCode::SizeLimit,
            Self::DepthLimit { .. } => StatusCode::DepthLimit,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ErrorExt for DecodeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnknownConstructorCode { .. } => StatusCode::UnknownConstructorCode,
            Self::UnexpectedEof { .. } => StatusCode::UnexpectedEof,
            Self::InvalidCustomArgs { .. } => StatusCode::DecodingError,
            Self::DepthLimit { .. } => StatusCode::DepthLimit,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl std::fmt::Display for EncodeError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::UnsupportedType { type_name } => {
                write!(f, "Encoding of item {type_name} is not supported")
            }
            Self::ConstructorCodeTooLarge { type_name, code } => {
                write!(f, "Code {code} is too big for a constructor ({type_name})")
            }
            Self::OutOfMemory {
                requested: Some(requested),
                capacity,
            } => write!(
                f,
                "Out of memory: cannot grow buffer from {capacity} to {requested} bytes"
            ),
            Self::OutOfMemory {
                requested: None,
                capacity,
            } => write!(
                f,
                "Out of memory: requested size overflows (capacity {capacity})"
            ),
            Self::WideIntOutOfRange { value } => {
                write!(f, "Wide integer {value} does not fit into 64 bits")
            }
            Self::DepthLimit { current, max } => {
                write!(f, "Depth limit exceeded: {current} > {max}")
            }
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            Self::UnknownConstructorCode { code } => write!(f, "Unknown constructor code {code}"),
            Self::UnexpectedEof {
                context,
                offset,
                needed,
            } => write!(
                f,
                "Unexpected EOF while reading {context}: need {needed} bytes at offset {offset}"
            ),
            Self::InvalidCustomArgs { code, found } => write!(
                f,
                "Arguments of constructor {code} must be an array, found {found}"
            ),
            Self::DepthLimit { current, max } => {
                write!(f, "Depth limit exceeded: {current} > {max}")
            }
        }
    }
}

impl std::error::Error for EncodeError {}

impl std::error::Error for DecodeError {}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_status_codes() {
        let cases = vec![
            (
                EncodeError::UnsupportedType {
                    type_name: "Point".into(),
                },
                StatusCode::UnsupportedType,
            ),
            (
                EncodeError::ConstructorCodeTooLarge {
                    type_name: "Point".into(),
                    code: 1 << 32,
                },
                StatusCode::ConstructorCodeTooLarge,
            ),
            (
                EncodeError::OutOfMemory {
                    requested: None,
                    capacity: 16,
                },
                StatusCode::OutOfMemory,
            ),
            (
                EncodeError::DepthLimit {
                    current: 513,
                    max: 512,
                },
                StatusCode::DepthLimit,
            ),
        ];

        for (err, code) in cases {
            assert_eq!(err.status_code(), code, "err={err:?}");
        }
    }

    #[test]
    fn test_decode_display() {
        let err = DecodeError::UnexpectedEof {
            context: "uint32".into(),
            offset: 5,
            needed: 4,
        };
        assert_eq!(
            err.to_string(),
            "Unexpected EOF while reading uint32: need 4 bytes at offset 5"
        );
        assert_eq!(err.status_code(), StatusCode::UnexpectedEof);
    }
}
