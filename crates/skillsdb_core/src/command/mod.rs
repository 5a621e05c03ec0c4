//! Command interpretation: flag resolution, token parsing, query building.
//!
//! # Responsibility
//! - Turn raw flags and free-text tokens into a validated, typed command.
//! - Keep every grammar decision here, ahead of any store access.
//!
//! # Invariants
//! - Nothing in this module touches the database.
//! - All rejections carry a typed [`crate::CommandError`] variant.

pub mod query;
pub mod resolver;
pub mod token;

pub use query::{CompareOp, Predicate, QueryToken};
pub use resolver::{CommandFlags, Operation};
pub use token::Assignments;
