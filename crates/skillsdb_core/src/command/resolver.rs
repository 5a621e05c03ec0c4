//! Operation resolver: flags to `(EntityType, Operation)`.
//!
//! # Responsibility
//! - Select exactly one entity and one operation from the flag set.
//! - Enforce the identifier-usage matrix for pid/rid.
//!
//! # Invariants
//! - `pid` and `rid` are mutually exclusive.
//! - Parent creation never carries a pid; every other creation requires one.
//! - Parent targets update/delete via pid; Address updates via pid but
//!   deletes via rid like every other non-parent entity.

use crate::error::{CommandError, CommandResult};
use crate::model::EntityType;
use serde::Serialize;

/// CRUD operation selected by the command flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Create,
    Retrieve,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Operation::Create => "create",
            Operation::Retrieve => "retrieve",
            Operation::Update => "update",
            Operation::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Validated flag set handed over by the CLI shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandFlags {
    pub parent: bool,
    pub child: bool,
    pub skill: bool,
    pub freetime: bool,
    pub address: bool,
    pub add: bool,
    pub delete: bool,
    pub modify: bool,
    pub search: bool,
    pub pid: Option<i64>,
    pub rid: Option<i64>,
}

/// Resolves the flag set to a `(EntityType, Operation)` pair, enforcing the
/// identifier-usage matrix.
pub fn resolve(flags: &CommandFlags) -> CommandResult<(EntityType, Operation)> {
    let entity = selected_entity(flags)?;
    let operation = selected_operation(flags)?;

    if flags.pid.is_some() && flags.rid.is_some() {
        return Err(CommandError::Operation(
            "--pid and --rid are mutually exclusive".to_string(),
        ));
    }

    match operation {
        Operation::Create => {
            if flags.rid.is_some() {
                return Err(CommandError::Operation(
                    "create never takes --rid".to_string(),
                ));
            }
            if entity == EntityType::Parent {
                if flags.pid.is_some() {
                    return Err(CommandError::Operation(
                        "creating a parent must not carry --pid".to_string(),
                    ));
                }
            } else if flags.pid.is_none() {
                return Err(CommandError::Operation(format!(
                    "creating a {entity} requires --pid naming the owning parent"
                )));
            }
        }
        Operation::Retrieve => {
            if flags.pid.is_some() || flags.rid.is_some() {
                return Err(CommandError::Operation(
                    "search takes neither --pid nor --rid".to_string(),
                ));
            }
        }
        Operation::Update => match entity {
            EntityType::Parent | EntityType::Address => {
                if flags.rid.is_some() {
                    return Err(CommandError::Operation(format!(
                        "updating a {entity} is keyed by --pid, not --rid"
                    )));
                }
                if flags.pid.is_none() {
                    return Err(CommandError::Operation(format!(
                        "updating a {entity} requires --pid"
                    )));
                }
            }
            _ => {
                if flags.rid.is_none() {
                    return Err(CommandError::Operation(format!(
                        "updating a {entity} requires --rid"
                    )));
                }
            }
        },
        Operation::Delete => {
            if entity == EntityType::Parent {
                if flags.pid.is_none() {
                    return Err(CommandError::Operation(
                        "deleting a parent requires --pid".to_string(),
                    ));
                }
            } else {
                if flags.pid.is_some() {
                    return Err(CommandError::Operation(format!(
                        "deleting a {entity} must not carry --pid"
                    )));
                }
                if flags.rid.is_none() {
                    return Err(CommandError::Operation(format!(
                        "deleting a {entity} requires --rid"
                    )));
                }
            }
        }
    }

    Ok((entity, operation))
}

fn selected_entity(flags: &CommandFlags) -> CommandResult<EntityType> {
    let selected = [
        (flags.parent, EntityType::Parent),
        (flags.child, EntityType::Child),
        (flags.skill, EntityType::Skill),
        (flags.freetime, EntityType::Freetime),
        (flags.address, EntityType::Address),
    ]
    .into_iter()
    .filter(|(set, _)| *set)
    .map(|(_, entity)| entity)
    .collect::<Vec<_>>();

    match selected.as_slice() {
        [entity] => Ok(*entity),
        [] => Err(CommandError::Operation("table not found".to_string())),
        _ => Err(CommandError::Operation(
            "exactly one table flag must be set".to_string(),
        )),
    }
}

fn selected_operation(flags: &CommandFlags) -> CommandResult<Operation> {
    let selected = [
        (flags.add, Operation::Create),
        (flags.search, Operation::Retrieve),
        (flags.modify, Operation::Update),
        (flags.delete, Operation::Delete),
    ]
    .into_iter()
    .filter(|(set, _)| *set)
    .map(|(_, operation)| operation)
    .collect::<Vec<_>>();

    match selected.as_slice() {
        [operation] => Ok(*operation),
        [] => Err(CommandError::Operation("operation not found".to_string())),
        _ => Err(CommandError::Operation(
            "exactly one operation flag must be set".to_string(),
        )),
    }
}
