use crate::{
    codec::ConstraintViolation, config::ConfigError, key::KeyDecodeError,
    predicate::PredicateUnsupported, schema::SchemaError,
};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Module-local error types convert into this at the crate boundary.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    /// Construct an InternalError without structured detail.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct a scan-origin invariant violation.
    pub(crate) fn scan_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Scan,
            message.into(),
        )
    }

    /// Construct a group-origin invariant violation.
    pub(crate) fn group_invariant(message: impl Into<String>) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Group,
            message.into(),
        )
    }

    /// Construct a key-origin corruption error.
    pub(crate) fn key_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Key, message.into())
    }

    #[must_use]
    pub const fn is_constraint_violation(&self) -> bool {
        matches!(self.class, ErrorClass::ConstraintViolation)
    }

    /// Borrow the constraint violation payload, if this error carries one.
    #[must_use]
    pub const fn constraint_violation(&self) -> Option<&ConstraintViolation> {
        match &self.detail {
            Some(ErrorDetail::Constraint(violation)) => Some(violation),
            _ => None,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Constraint(ConstraintViolation),
    #[error("{0}")]
    Key(KeyDecodeError),
}

impl From<ConstraintViolation> for InternalError {
    fn from(err: ConstraintViolation) -> Self {
        Self {
            class: ErrorClass::ConstraintViolation,
            origin: ErrorOrigin::Codec,
            message: err.to_string(),
            detail: Some(ErrorDetail::Constraint(err)),
        }
    }
}

impl From<KeyDecodeError> for InternalError {
    fn from(err: KeyDecodeError) -> Self {
        Self {
            class: ErrorClass::Corruption,
            origin: ErrorOrigin::Key,
            message: err.to_string(),
            detail: Some(ErrorDetail::Key(err)),
        }
    }
}

impl From<PredicateUnsupported> for InternalError {
    fn from(err: PredicateUnsupported) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Predicate, err.to_string())
    }
}

impl From<SchemaError> for InternalError {
    fn from(err: SchemaError) -> Self {
        Self::new(
            ErrorClass::InvariantViolation,
            ErrorOrigin::Schema,
            err.to_string(),
        )
    }
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::Config, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    ConstraintViolation,
    Corruption,
    Unsupported,
    InvariantViolation,
    Config,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::ConstraintViolation => "constraint_violation",
            Self::Corruption => "corruption",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Schema,
    Codec,
    Key,
    Predicate,
    Scan,
    Group,
    Config,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Schema => "schema",
            Self::Codec => "codec",
            Self::Key => "key",
            Self::Predicate => "predicate",
            Self::Scan => "scan",
            Self::Group => "group",
            Self::Config => "config",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
