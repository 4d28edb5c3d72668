use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки реестра пользовательских типов.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Constructor code {code} of {name} is already taken by {existing}")]
    DuplicateCode {
        code: u64,
        name: String,
        existing: String,
    },

    #[error("Custom type {name} is already registered")]
    DuplicateName { name: String },

    #[error("Invalid arguments for {type_name}: {reason}")]
    InvalidArgs { type_name: String, reason: String },
}

impl ErrorExt for RegistryError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::DuplicateCode { .. } | Self::DuplicateName { .. } => StatusCode::DuplicateEntry,
            Self::InvalidArgs { .. } => StatusCode::InvalidArgs,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_error_display() {
        let err = RegistryError::DuplicateCode {
            code: 1,
            name: "Moment".into(),
            existing: "Date".into(),
        };
        assert_eq!(
            err.to_string(),
            "Constructor code 1 of Moment is already taken by Date"
        );
        assert_eq!(err.status_code(), StatusCode::DuplicateEntry);
    }

    #[test]
    fn test_invalid_args_is_client_error() {
        let err = RegistryError::InvalidArgs {
            type_name: "RegExp".into(),
            reason: "bad flags".into(),
        };
        assert!(err.status_code().is_client_error());
    }
}
