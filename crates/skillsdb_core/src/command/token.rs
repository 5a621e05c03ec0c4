//! Token parsing: assignment and predicate grammars.
//!
//! # Responsibility
//! - Split raw tokens into validated `(field, value)` assignments.
//! - Split search tokens into condition/connective query tokens.
//!
//! # Invariants
//! - Every key is checked against the static entity schema before use.
//! - Time-of-day values only accept `H:MM` / `HH:MM`.

use crate::command::query::{CompareOp, QueryToken};
use crate::error::{CommandError, CommandResult};
use crate::model::{time_of_day_ms, EntityType, FieldValue};
use crate::schema;
use once_cell::sync::Lazy;
use regex::Regex;

static TIME_OF_DAY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([01]?\d|2[0-3]):([0-5]\d)$").expect("valid time regex"));

/// Parsed assignment tokens for a create/update command.
#[derive(Debug, Clone, Default)]
pub struct Assignments {
    /// Canonical field names with their parsed values, in token order.
    pub fields: Vec<(&'static str, FieldValue)>,
    /// Relationship-role reference (`partner=<id>` on a parent command).
    pub partner: Option<i64>,
}

/// Parses assignment-grammar tokens (`key=value`) for the given entity.
pub fn parse_assignments(entity: EntityType, tokens: &[String]) -> CommandResult<Assignments> {
    let mut assignments = Assignments::default();

    for token in tokens {
        let (key, value) = split_assignment(token)?;

        if Some(key) == schema::relation_role(entity) {
            let id = value.parse::<i64>().map_err(|_| {
                CommandError::Format(format!("`{value}` is not a valid {key} identifier"))
            })?;
            assignments.partner = Some(id);
            continue;
        }

        let field = schema::canonical_field(entity, key).ok_or_else(|| CommandError::Schema {
            entity,
            field: key.to_string(),
        })?;

        let value = if schema::is_time_field(entity, field) {
            FieldValue::Timestamp(parse_time_of_day(value)?)
        } else {
            FieldValue::Text(value.to_string())
        };
        assignments.fields.push((field, value));
    }

    Ok(assignments)
}

/// Parses predicate-grammar tokens for a search command.
///
/// Condition tokens have the shape `key=value,operator`; bare `AND`, `OR`
/// and `NOT` tokens are logical connectives.
pub fn parse_query_tokens(entity: EntityType, tokens: &[String]) -> CommandResult<Vec<QueryToken>> {
    tokens
        .iter()
        .map(|token| parse_query_token(entity, token))
        .collect()
}

fn parse_query_token(entity: EntityType, token: &str) -> CommandResult<QueryToken> {
    match token {
        "AND" => return Ok(QueryToken::And),
        "OR" => return Ok(QueryToken::Or),
        "NOT" => return Ok(QueryToken::Not),
        _ => {}
    }

    if token.matches(',').count() != 1 {
        return Err(CommandError::Query(format!(
            "condition `{token}` must contain exactly one `,` separating value and operator"
        )));
    }
    let (assignment, operator) = token.rsplit_once(',').expect("one comma present");

    let op = match operator {
        "equals" => CompareOp::Equals,
        "startswith" => CompareOp::StartsWith,
        "contains" => CompareOp::Contains,
        "like" => CompareOp::Like,
        other => {
            return Err(CommandError::Query(format!(
                "`{other}` is not a known operator (equals, startswith, contains, like)"
            )))
        }
    };

    let (key, value) = split_condition_assignment(assignment)?;
    let field = schema::canonical_field(entity, key).ok_or_else(|| CommandError::Schema {
        entity,
        field: key.to_string(),
    })?;

    Ok(QueryToken::Condition {
        field,
        op,
        value: value.to_string(),
    })
}

fn split_assignment(token: &str) -> CommandResult<(&str, &str)> {
    if token.matches('=').count() != 1 {
        return Err(CommandError::Format(format!(
            "token `{token}` must contain exactly one `=`"
        )));
    }
    Ok(token.split_once('=').expect("one equals present"))
}

fn split_condition_assignment(assignment: &str) -> CommandResult<(&str, &str)> {
    if assignment.matches('=').count() != 1 {
        return Err(CommandError::Query(format!(
            "condition `{assignment}` must contain exactly one `=`"
        )));
    }
    Ok(assignment.split_once('=').expect("one equals present"))
}

fn parse_time_of_day(value: &str) -> CommandResult<i64> {
    let captures = TIME_OF_DAY.captures(value).ok_or_else(|| {
        CommandError::Format(format!("`{value}` is not a time of day (expected hh:mm)"))
    })?;
    let hour: u32 = captures[1].parse().expect("matched digits");
    let minute: u32 = captures[2].parse().expect("matched digits");
    Ok(time_of_day_ms(hour, minute))
}
