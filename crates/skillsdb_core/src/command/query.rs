//! Predicate AST construction and SQL translation.
//!
//! # Responsibility
//! - Assemble the boolean predicate tree from a query token stack.
//! - Translate the tree to a parameterized WHERE clause.
//!
//! # Invariants
//! - Tokens are consumed last-in-first-out.
//! - Every value reaches the store as a bound parameter, never interpolated.
//! - Field names in the tree come from the static schema tables only.

use crate::error::{CommandError, CommandResult};
use rusqlite::types::Value;

/// Comparison operator of a leaf condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equals,
    StartsWith,
    Contains,
    /// Raw `LIKE` pattern supplied by the caller, still bound as a parameter.
    Like,
}

/// One parsed search token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryToken {
    Condition {
        field: &'static str,
        op: CompareOp,
        value: String,
    },
    And,
    Or,
    Not,
}

/// Composed boolean filter expression over one entity table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Compare {
        field: &'static str,
        op: CompareOp,
        value: String,
    },
    And(Box<Predicate>, Box<Predicate>),
    Or(Box<Predicate>, Box<Predicate>),
    Not(Box<Predicate>),
}

/// Builds the predicate tree by consuming the token sequence as a stack.
///
/// Popping a connective combines the groups built from the tokens beneath
/// it; popping a condition emits a leaf. A request with zero condition
/// tokens, dangling tokens, or a connective missing an operand is rejected.
pub fn build_predicate(tokens: Vec<QueryToken>) -> CommandResult<Predicate> {
    let mut stack = tokens;
    if stack.is_empty() {
        return Err(CommandError::Query(
            "search requires at least one condition".to_string(),
        ));
    }

    let predicate = pop_group(&mut stack)?;

    if !stack.is_empty() {
        return Err(CommandError::Query(format!(
            "{} dangling token(s) left after the predicate closed",
            stack.len()
        )));
    }

    Ok(predicate)
}

fn pop_group(stack: &mut Vec<QueryToken>) -> CommandResult<Predicate> {
    match stack.pop() {
        None => Err(CommandError::Query(
            "connective is missing a condition operand".to_string(),
        )),
        Some(QueryToken::Condition { field, op, value }) => {
            Ok(Predicate::Compare { field, op, value })
        }
        Some(QueryToken::Not) => Ok(Predicate::Not(Box::new(pop_group(stack)?))),
        Some(QueryToken::And) => {
            let right = pop_group(stack)?;
            let left = pop_group(stack)?;
            Ok(Predicate::And(Box::new(left), Box::new(right)))
        }
        Some(QueryToken::Or) => {
            let right = pop_group(stack)?;
            let left = pop_group(stack)?;
            Ok(Predicate::Or(Box::new(left), Box::new(right)))
        }
    }
}

impl Predicate {
    /// Renders the tree as a SQL boolean expression with bound values.
    ///
    /// AND/OR map to SQL's short-circuiting connectives; NOT to `NOT (…)`.
    pub fn to_sql(&self, bind_values: &mut Vec<Value>) -> String {
        match self {
            Predicate::Compare { field, op, value } => {
                let (clause, bound) = compare_sql(field, *op, value);
                bind_values.push(Value::Text(bound));
                clause
            }
            Predicate::And(left, right) => format!(
                "({} AND {})",
                left.to_sql(bind_values),
                right.to_sql(bind_values)
            ),
            Predicate::Or(left, right) => format!(
                "({} OR {})",
                left.to_sql(bind_values),
                right.to_sql(bind_values)
            ),
            Predicate::Not(inner) => format!("(NOT {})", inner.to_sql(bind_values)),
        }
    }
}

fn compare_sql(field: &str, op: CompareOp, value: &str) -> (String, String) {
    match op {
        CompareOp::Equals => (format!("{field} = ?"), value.to_string()),
        CompareOp::StartsWith => (
            format!("{field} LIKE ? ESCAPE '\\'"),
            format!("{}%", escape_like(value)),
        ),
        CompareOp::Contains => (
            format!("{field} LIKE ? ESCAPE '\\'"),
            format!("%{}%", escape_like(value)),
        ),
        CompareOp::Like => (format!("{field} LIKE ? ESCAPE '\\'"), value.to_string()),
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
