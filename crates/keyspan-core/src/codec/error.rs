use thiserror::Error as ThisError;

///
/// ConstraintViolation
///
/// Encode-time width or nullability failure for one column.
/// The rendered message is part of the caller-visible contract.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("{column} {detail}")]
pub struct ConstraintViolation {
    pub column: String,
    pub detail: ConstraintDetail,
}

impl ConstraintViolation {
    pub fn new(column: impl Into<String>, detail: ConstraintDetail) -> Self {
        Self {
            column: column.into(),
            detail,
        }
    }
}

///
/// ConstraintDetail
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConstraintDetail {
    #[error("may not be null")]
    MayNotBeNull,

    #[error("must be {width} bytes")]
    MustBe { width: usize },

    #[error("may not exceed {max} bytes")]
    MayNotExceed { max: usize },

    #[error("may not contain a zero byte")]
    ContainsZeroByte,

    #[error("may not use the null encoding while nullable")]
    NullSentinel,

    #[error("expects {expected} but got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}
