//! Record store contract and persistence implementations.
//!
//! # Responsibility
//! - Define the storage capability set consumed by linker and dispatcher.
//! - Isolate SQL details from command interpretation and orchestration.
//!
//! # Invariants
//! - Row values reach SQL as bound parameters; column names come from the
//!   static schema tables.
//! - `update`/`delete` report missing targets as `NotFound`, not as success.

use crate::command::query::Predicate;
use crate::error::CommandResult;
use crate::model::{Address, EntityType, FieldValue, Record};

mod sqlite;

pub use sqlite::SqliteRecordStore;

/// Storage capability set for one entity-typed relational store.
///
/// Transaction boundaries are owned by the caller: the dispatcher runs each
/// mutating command against a store borrowed from a `rusqlite::Transaction`.
pub trait RecordStore {
    fn get(&self, entity: EntityType, id: i64) -> CommandResult<Option<Record>>;
    fn find(&self, entity: EntityType, predicate: &Predicate) -> CommandResult<Vec<Record>>;
    fn insert(
        &self,
        entity: EntityType,
        fields: &[(&'static str, FieldValue)],
    ) -> CommandResult<i64>;
    fn update(
        &self,
        entity: EntityType,
        id: i64,
        fields: &[(&'static str, FieldValue)],
    ) -> CommandResult<()>;
    /// Removes the row and any join-table edges referencing it. Dependent
    /// rows are never cascaded; they become orphans.
    fn delete(&self, entity: EntityType, id: i64) -> CommandResult<()>;

    /// Forward partner lookup: the id this parent points at.
    fn partner_of(&self, parent_id: i64) -> CommandResult<Option<i64>>;
    /// Reverse partner lookup: the id pointing at this parent.
    fn other_of(&self, parent_id: i64) -> CommandResult<Option<i64>>;
    fn link_partner(&self, parent_id: i64, partner_id: i64) -> CommandResult<()>;

    /// Inserts a join-table edge from a parent to a child/skill/freetime row.
    fn link_parent_edge(
        &self,
        entity: EntityType,
        parent_id: i64,
        record_id: i64,
    ) -> CommandResult<()>;
    /// Parents currently linked to a child/skill/freetime row, in id order.
    fn linked_parent_ids(&self, entity: EntityType, record_id: i64) -> CommandResult<Vec<i64>>;

    /// One-to-one address lookup through the parent link.
    fn address_of_parent(&self, parent_id: i64) -> CommandResult<Option<Address>>;
}
