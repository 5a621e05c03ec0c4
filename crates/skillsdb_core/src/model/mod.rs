//! Domain model for the skillsdb relational dataset.
//!
//! # Responsibility
//! - Define the closed set of entity types and their typed row shapes.
//! - Keep derived values (availability period) next to the data they
//!   derive from.
//!
//! # Invariants
//! - Record identifiers are immutable once assigned by the store.
//! - Entity dispatch is always by `EntityType` variant, never by string key.

pub mod entity;

pub use entity::{
    time_of_day_ms, Address, Child, EntityType, FieldValue, Freetime, Parent, Period, Record,
    Skill,
};
