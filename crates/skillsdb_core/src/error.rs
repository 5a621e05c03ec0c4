//! Command error taxonomy.
//!
//! # Responsibility
//! - Give every failure mode of the interpretation engine a typed variant
//!   with a human-readable message.
//!
//! # Invariants
//! - Validation errors are raised before any mutation is attempted.
//! - Store failures inside a transaction roll back and propagate unchanged.

use crate::db::DbError;
use crate::model::EntityType;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug)]
pub enum CommandError {
    /// Flag combination violates the resolver matrix.
    Operation(String),
    /// Referenced field name is not defined for the target entity.
    Schema {
        entity: EntityType,
        field: String,
    },
    /// Malformed time-of-day value or integer identifier.
    Format(String),
    /// Malformed condition token, unknown operator, or empty predicate.
    Query(String),
    /// Referenced parent/record id does not resolve to an existing row.
    Link(String),
    /// Update/delete target id resolves to no row.
    NotFound {
        entity: EntityType,
        id: i64,
    },
    /// Underlying persistence failure.
    Store(DbError),
}

impl Display for CommandError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Operation(message) => write!(f, "operation error: {message}"),
            Self::Schema { entity, field } => {
                write!(f, "`{field}` is not a field of the {entity} table")
            }
            Self::Format(message) => write!(f, "format error: {message}"),
            Self::Query(message) => write!(f, "query error: {message}"),
            Self::Link(message) => write!(f, "link error: {message}"),
            Self::NotFound { entity, id } => write!(f, "{entity} {id} not found"),
            Self::Store(err) => write!(f, "store error: {err}"),
        }
    }
}

impl Error for CommandError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for CommandError {
    fn from(value: DbError) -> Self {
        Self::Store(value)
    }
}

impl From<rusqlite::Error> for CommandError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Store(DbError::Sqlite(value))
    }
}
