//! Record dispatcher: one validated command in, one CRUD effect out.
//!
//! # Responsibility
//! - Drive resolver, token parser, query builder and linker in order.
//! - Own the transaction boundary for every mutating command.
//!
//! # Invariants
//! - Validation and link resolution happen before any row is persisted.
//! - A mutating command commits all of its row and edge changes or none;
//!   dropping the transaction on an error path rolls everything back.

use crate::command::query::build_predicate;
use crate::command::resolver::{resolve, CommandFlags, Operation};
use crate::command::token::{parse_assignments, parse_query_tokens, Assignments};
use crate::error::{CommandError, CommandResult};
use crate::link;
use crate::model::{EntityType, FieldValue, Freetime, Record};
use crate::store::{RecordStore, SqliteRecordStore};
use log::{error, info};
use rusqlite::Connection;
use serde::Serialize;

/// One command as handed over by the CLI shell.
#[derive(Debug, Clone)]
pub struct CommandRequest {
    pub flags: CommandFlags,
    pub tokens: Vec<String>,
}

/// Terminal effect of a dispatched command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum CommandOutcome {
    Created { entity: EntityType, id: i64 },
    Matched { records: Vec<Record> },
    Updated { entity: EntityType, id: i64 },
    Deleted { entity: EntityType, id: i64 },
}

/// Interprets and executes one command against the store.
pub fn dispatch(conn: &mut Connection, request: &CommandRequest) -> CommandResult<CommandOutcome> {
    let (entity, operation) = resolve(&request.flags)?;
    info!("event=dispatch module=dispatch status=start entity={entity} op={operation}");

    let result = match operation {
        Operation::Create => create(conn, entity, &request.flags, &request.tokens),
        Operation::Retrieve => retrieve(conn, entity, &request.tokens),
        Operation::Update => update(conn, entity, &request.flags, &request.tokens),
        Operation::Delete => delete(conn, entity, &request.flags, &request.tokens),
    };

    match &result {
        Ok(_) => info!("event=dispatch module=dispatch status=ok entity={entity} op={operation}"),
        Err(err) => error!(
            "event=dispatch module=dispatch status=error entity={entity} op={operation} error={err}"
        ),
    }
    result
}

fn create(
    conn: &mut Connection,
    entity: EntityType,
    flags: &CommandFlags,
    tokens: &[String],
) -> CommandResult<CommandOutcome> {
    let assignments = parse_assignments(entity, tokens)?;

    let tx = conn.transaction().map_err(CommandError::from)?;
    let id = {
        let store = SqliteRecordStore::new(&tx);
        match entity {
            EntityType::Parent => {
                let id = store.insert(entity, &assignments.fields)?;
                if let Some(partner_ref) = assignments.partner {
                    link::establish_partner(&store, id, partner_ref)?;
                }
                id
            }
            EntityType::Address => {
                let pid = required_pid(flags)?;
                let owners = link::resolve_owning_parent(&store, pid)?;
                link::ensure_parent_without_address(&store, owners.parent_id)?;
                let mut fields = assignments.fields.clone();
                fields.push(("parent_id", FieldValue::Integer(owners.parent_id)));
                store.insert(entity, &fields)?
            }
            EntityType::Child | EntityType::Skill | EntityType::Freetime => {
                let pid = required_pid(flags)?;
                let owners = link::resolve_owning_parent(&store, pid)?;
                let fields = with_entity_defaults(entity, &assignments);
                let id = store.insert(entity, &fields)?;
                link::link_created(&store, entity, id, &owners)?;
                id
            }
        }
    };
    tx.commit().map_err(CommandError::from)?;

    Ok(CommandOutcome::Created { entity, id })
}

fn retrieve(
    conn: &Connection,
    entity: EntityType,
    tokens: &[String],
) -> CommandResult<CommandOutcome> {
    let query_tokens = parse_query_tokens(entity, tokens)?;
    let predicate = build_predicate(query_tokens)?;

    let store = SqliteRecordStore::new(conn);
    let records = store.find(entity, &predicate)?;
    Ok(CommandOutcome::Matched { records })
}

fn update(
    conn: &mut Connection,
    entity: EntityType,
    flags: &CommandFlags,
    tokens: &[String],
) -> CommandResult<CommandOutcome> {
    let assignments = parse_assignments(entity, tokens)?;

    let tx = conn.transaction().map_err(CommandError::from)?;
    let id = {
        let store = SqliteRecordStore::new(&tx);
        match entity {
            EntityType::Parent => {
                let pid = required_pid(flags)?;
                store.update(entity, pid, &assignments.fields)?;
                if let Some(partner_ref) = assignments.partner {
                    link::establish_partner(&store, pid, partner_ref)?;
                }
                pid
            }
            EntityType::Address => {
                // An address is addressed through its parent, not its own id.
                let pid = required_pid(flags)?;
                link::resolve_owning_parent(&store, pid)?;
                let address = store
                    .address_of_parent(pid)?
                    .ok_or(CommandError::NotFound { entity, id: pid })?;
                store.update(entity, address.id, &assignments.fields)?;
                address.id
            }
            EntityType::Child | EntityType::Skill | EntityType::Freetime => {
                let rid = required_rid(flags)?;
                store.update(entity, rid, &assignments.fields)?;
                rid
            }
        }
    };
    tx.commit().map_err(CommandError::from)?;

    Ok(CommandOutcome::Updated { entity, id })
}

fn delete(
    conn: &mut Connection,
    entity: EntityType,
    flags: &CommandFlags,
    tokens: &[String],
) -> CommandResult<CommandOutcome> {
    if !tokens.is_empty() {
        return Err(CommandError::Query(format!(
            "delete takes no free-text tokens, got `{}`",
            tokens.join(" ")
        )));
    }

    let id = match entity {
        EntityType::Parent => required_pid(flags)?,
        _ => required_rid(flags)?,
    };

    let tx = conn.transaction().map_err(CommandError::from)?;
    {
        let store = SqliteRecordStore::new(&tx);
        store.delete(entity, id)?;
    }
    tx.commit().map_err(CommandError::from)?;

    Ok(CommandOutcome::Deleted { entity, id })
}

/// Fills store-required defaults the token stream did not supply.
fn with_entity_defaults(
    entity: EntityType,
    assignments: &Assignments,
) -> Vec<(&'static str, FieldValue)> {
    let mut fields = assignments.fields.clone();
    if entity == EntityType::Freetime {
        for (name, value) in Freetime::default_windows() {
            if !fields.iter().any(|(field, _)| *field == name) {
                fields.push((name, FieldValue::Timestamp(value)));
            }
        }
    }
    fields
}

fn required_pid(flags: &CommandFlags) -> CommandResult<i64> {
    flags
        .pid
        .ok_or_else(|| CommandError::Operation("--pid is required here".to_string()))
}

fn required_rid(flags: &CommandFlags) -> CommandResult<i64> {
    flags
        .rid
        .ok_or_else(|| CommandError::Operation("--rid is required here".to_string()))
}
