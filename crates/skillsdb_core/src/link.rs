//! Relationship linker for create/update commands.
//!
//! # Responsibility
//! - Resolve pid references to existing parent rows before anything persists.
//! - Attach partner and parent/child/skill/freetime edges.
//!
//! # Invariants
//! - A referenced parent id that resolves to no row is a `Link` error.
//! - A partner pair is single-valued; re-pairing an already-partnered parent
//!   is rejected until the existing edge is cleared.

use crate::error::{CommandError, CommandResult};
use crate::model::EntityType;
use crate::store::RecordStore;

/// Owning parent (and partner, when one resolves) for a new record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedParents {
    pub parent_id: i64,
    pub partner_id: Option<i64>,
}

/// Resolves a pid to the owning parent and its partner, via either
/// direction of the partner edge.
pub fn resolve_owning_parent<S: RecordStore>(
    store: &S,
    pid: i64,
) -> CommandResult<ResolvedParents> {
    if store.get(EntityType::Parent, pid)?.is_none() {
        return Err(CommandError::Link(format!(
            "parent {pid} does not resolve to an existing row"
        )));
    }
    let partner_id = match store.partner_of(pid)? {
        Some(partner) => Some(partner),
        None => store.other_of(pid)?,
    };
    Ok(ResolvedParents {
        parent_id: pid,
        partner_id,
    })
}

/// Pairs a parent with another parent row.
///
/// Re-stating the existing pairing is a no-op; pairing with self, a missing
/// row, or while either side is already partnered is a `Link` error.
pub fn establish_partner<S: RecordStore>(
    store: &S,
    parent_id: i64,
    partner_ref: i64,
) -> CommandResult<()> {
    if partner_ref == parent_id {
        return Err(CommandError::Link(format!(
            "parent {parent_id} cannot partner itself"
        )));
    }
    if store.get(EntityType::Parent, partner_ref)?.is_none() {
        return Err(CommandError::Link(format!(
            "partner {partner_ref} does not resolve to an existing row"
        )));
    }

    if store.partner_of(parent_id)? == Some(partner_ref) {
        return Ok(());
    }
    if partnered_either_direction(store, parent_id)? {
        return Err(CommandError::Link(format!(
            "parent {parent_id} is already partnered; clear the existing link first"
        )));
    }
    if partnered_either_direction(store, partner_ref)? {
        return Err(CommandError::Link(format!(
            "parent {partner_ref} is already partnered; clear the existing link first"
        )));
    }

    store.link_partner(parent_id, partner_ref)
}

/// Attaches join-table edges for a freshly created record.
///
/// Children link to the owning parent and, when resolved, the partner;
/// skills and freetimes link to the single owning parent. Parent and
/// address rows carry no join edges.
pub fn link_created<S: RecordStore>(
    store: &S,
    entity: EntityType,
    record_id: i64,
    owners: &ResolvedParents,
) -> CommandResult<()> {
    match entity {
        EntityType::Child => {
            store.link_parent_edge(entity, owners.parent_id, record_id)?;
            if let Some(partner_id) = owners.partner_id {
                store.link_parent_edge(entity, partner_id, record_id)?;
            }
            Ok(())
        }
        EntityType::Skill | EntityType::Freetime => {
            store.link_parent_edge(entity, owners.parent_id, record_id)
        }
        EntityType::Parent | EntityType::Address => Ok(()),
    }
}

/// Guards the one-to-one address link before an insert.
pub fn ensure_parent_without_address<S: RecordStore>(
    store: &S,
    parent_id: i64,
) -> CommandResult<()> {
    if let Some(existing) = store.address_of_parent(parent_id)? {
        return Err(CommandError::Link(format!(
            "parent {parent_id} already has address {}",
            existing.id
        )));
    }
    Ok(())
}

fn partnered_either_direction<S: RecordStore>(store: &S, parent_id: i64) -> CommandResult<bool> {
    Ok(store.partner_of(parent_id)?.is_some() || store.other_of(parent_id)?.is_some())
}
