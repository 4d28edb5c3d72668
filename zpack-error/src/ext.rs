use std::{any::Any, error::Error};

use crate::StatusCode;

/// Общий интерфейс ошибок кодека (object-safe).
///
/// [`StackError`](crate::StackError) хранит корневую ошибку как
/// `dyn ErrorExt`: статус-код доступен без знания конкретного типа, а
/// [`as_any`](ErrorExt::as_any) позволяет вернуться к нему через downcast.
pub trait ErrorExt: Error + Send + Sync + 'static {
    /// Статус ошибки.
    ///
    /// По умолчанию возвращает [`StatusCode::Internal`].
    fn status_code(&self) -> StatusCode {
        StatusCode::Internal
    }

    fn as_any(&self) -> &dyn Any;
}

#[cfg(test)]
mod tests {
    use std::{any::Any, error::Error, fmt};

    use super::*;

    // Ошибка без переопределения status_code (default = Internal).
    #[derive(Debug)]
    struct DefaultError(pub &'static str);

    impl fmt::Display for DefaultError {
        fn fmt(
            &self,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            write!(f, "DefaultError: {}", self.0)
        }
    }

    impl Error for DefaultError {}

    impl ErrorExt for DefaultError {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct TruncatedError(pub &'static str);

    impl fmt::Display for TruncatedError {
        fn fmt(
            &self,
            f: &mut fmt::Formatter<'_>,
        ) -> fmt::Result {
            write!(f, "Truncated: {}", self.0)
        }
    }

    impl Error for TruncatedError {}

    impl ErrorExt for TruncatedError {
        fn status_code(&self) -> StatusCode {
            StatusCode::UnexpectedEof
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_default_status_code_is_internal() {
        let e = DefaultError("oops");
        assert_eq!(e.status_code(), StatusCode::Internal);
        assert_eq!(TruncatedError("array").status_code(), StatusCode::UnexpectedEof);
    }

    #[test]
    fn test_as_any_downcast() {
        let e = TruncatedError("x");
        let down = e.as_any().downcast_ref::<TruncatedError>();
        assert_eq!(down.map(|d| d.0), Some("x"));
    }
}
