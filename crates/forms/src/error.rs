use crate::schema::EntityKind;
use database::DbError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// A required field is absent or blank.
    Missing,
    /// The input does not parse as the field's type.
    Invalid,
    OutOfRange,
    /// The field is not part of the entity (or of the selected role).
    Unknown,
}

/// One problem with one input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: String,
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub(crate) fn new(field: &str, kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum FormError {
    #[error("Unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("Invalid {entity} input: {}", summarize(.violations))]
    Validation {
        entity: EntityKind,
        violations: Vec<Violation>,
    },

    #[error("Cannot build a {expected} insert from a {actual} record")]
    KindMismatch {
        expected: EntityKind,
        actual: EntityKind,
    },

    #[error(transparent)]
    Database(#[from] DbError),
}

impl FormError {
    /// True for errors caused by the caller's input rather than the database.
    pub fn is_validation(&self) -> bool {
        !matches!(self, FormError::Database(_))
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            FormError::Validation { violations, .. } => violations,
            _ => &[],
        }
    }
}
