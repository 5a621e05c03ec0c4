//! SQLite implementation of the record store.
//!
//! # Responsibility
//! - Map entity rows to and from the SQLite tables created by migrations.
//! - Keep all SQL text in this file.
//!
//! # Invariants
//! - Every statement binds values positionally; user text never lands in SQL.
//! - Deletes remove join edges of the deleted row in the same call.

use crate::command::query::Predicate;
use crate::error::{CommandError, CommandResult};
use crate::model::{Address, Child, EntityType, FieldValue, Freetime, Parent, Record, Skill};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use super::RecordStore;

const PARENT_COLUMNS: &str = "id, first_name, second_name, created";
const CHILD_COLUMNS: &str = "id, first_name, second_name, created";
const SKILL_COLUMNS: &str = "id, name, created";
const FREETIME_COLUMNS: &str = "id, day, am_start, am_end, pm_start, pm_end, created";
const ADDRESS_COLUMNS: &str = "id, line01, line02, village, city, postcode, country, \
     home_telephone, mobile_telephone, other_telephone, home_email, work_email, other_email, \
     parent_id, created";

/// Record store over a borrowed connection.
///
/// Borrowing lets the dispatcher hand in either a plain `Connection` or a
/// `rusqlite::Transaction` (which derefs to one) without a second store type.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn get(&self, entity: EntityType, id: i64) -> CommandResult<Option<Record>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE id = ?1;",
            select_columns(entity),
            entity.table_name()
        );
        let record = self
            .conn
            .query_row(&sql, params![id], |row| parse_record(entity, row))
            .optional()?;
        Ok(record)
    }

    fn find(&self, entity: EntityType, predicate: &Predicate) -> CommandResult<Vec<Record>> {
        let mut bind_values: Vec<Value> = Vec::new();
        let where_clause = predicate.to_sql(&mut bind_values);
        let sql = format!(
            "SELECT {} FROM {} WHERE {} ORDER BY id ASC;",
            select_columns(entity),
            entity.table_name(),
            where_clause
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_record(entity, row)?);
        }
        Ok(records)
    }

    fn insert(
        &self,
        entity: EntityType,
        fields: &[(&'static str, FieldValue)],
    ) -> CommandResult<i64> {
        let columns = fields
            .iter()
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; fields.len()].join(", ");
        let sql = if fields.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES;", entity.table_name())
        } else {
            format!(
                "INSERT INTO {} ({columns}) VALUES ({placeholders});",
                entity.table_name()
            )
        };

        let bind_values = fields
            .iter()
            .map(|(_, value)| Value::from(value.clone()))
            .collect::<Vec<_>>();
        self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update(
        &self,
        entity: EntityType,
        id: i64,
        fields: &[(&'static str, FieldValue)],
    ) -> CommandResult<()> {
        if fields.is_empty() {
            // Nothing to overwrite; still surface a missing target.
            if self.get(entity, id)?.is_none() {
                return Err(CommandError::NotFound { entity, id });
            }
            return Ok(());
        }

        let assignments = fields
            .iter()
            .map(|(name, _)| format!("{name} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE id = ?;",
            entity.table_name()
        );

        let mut bind_values = fields
            .iter()
            .map(|(_, value)| Value::from(value.clone()))
            .collect::<Vec<_>>();
        bind_values.push(Value::Integer(id));

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(CommandError::NotFound { entity, id });
        }
        Ok(())
    }

    fn delete(&self, entity: EntityType, id: i64) -> CommandResult<()> {
        match entity {
            EntityType::Parent => {
                self.conn.execute(
                    "DELETE FROM partner WHERE parent_id = ?1 OR partner_id = ?1;",
                    params![id],
                )?;
                self.conn
                    .execute("DELETE FROM parent_child WHERE parent_id = ?1;", params![id])?;
                self.conn
                    .execute("DELETE FROM parent_skill WHERE parent_id = ?1;", params![id])?;
                self.conn.execute(
                    "DELETE FROM parent_freetime WHERE parent_id = ?1;",
                    params![id],
                )?;
            }
            EntityType::Child => {
                self.conn
                    .execute("DELETE FROM parent_child WHERE child_id = ?1;", params![id])?;
            }
            EntityType::Skill => {
                self.conn
                    .execute("DELETE FROM parent_skill WHERE skill_id = ?1;", params![id])?;
            }
            EntityType::Freetime => {
                self.conn.execute(
                    "DELETE FROM parent_freetime WHERE freetime_id = ?1;",
                    params![id],
                )?;
            }
            EntityType::Address => {}
        }

        let sql = format!("DELETE FROM {} WHERE id = ?1;", entity.table_name());
        let changed = self.conn.execute(&sql, params![id])?;
        if changed == 0 {
            return Err(CommandError::NotFound { entity, id });
        }
        Ok(())
    }

    fn partner_of(&self, parent_id: i64) -> CommandResult<Option<i64>> {
        let partner = self
            .conn
            .query_row(
                "SELECT partner_id FROM partner WHERE parent_id = ?1;",
                params![parent_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(partner)
    }

    fn other_of(&self, parent_id: i64) -> CommandResult<Option<i64>> {
        let other = self
            .conn
            .query_row(
                "SELECT parent_id FROM partner WHERE partner_id = ?1;",
                params![parent_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(other)
    }

    fn link_partner(&self, parent_id: i64, partner_id: i64) -> CommandResult<()> {
        self.conn.execute(
            "INSERT INTO partner (parent_id, partner_id) VALUES (?1, ?2);",
            params![parent_id, partner_id],
        )?;
        Ok(())
    }

    fn link_parent_edge(
        &self,
        entity: EntityType,
        parent_id: i64,
        record_id: i64,
    ) -> CommandResult<()> {
        let (table, column) = join_table(entity)?;
        let sql = format!("INSERT INTO {table} (parent_id, {column}) VALUES (?1, ?2);");
        self.conn.execute(&sql, params![parent_id, record_id])?;
        Ok(())
    }

    fn linked_parent_ids(&self, entity: EntityType, record_id: i64) -> CommandResult<Vec<i64>> {
        let (table, column) = join_table(entity)?;
        let sql =
            format!("SELECT parent_id FROM {table} WHERE {column} = ?1 ORDER BY parent_id ASC;");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params![record_id])?;
        let mut parent_ids = Vec::new();
        while let Some(row) = rows.next()? {
            parent_ids.push(row.get(0)?);
        }
        Ok(parent_ids)
    }

    fn address_of_parent(&self, parent_id: i64) -> CommandResult<Option<Address>> {
        let sql = format!("SELECT {ADDRESS_COLUMNS} FROM address WHERE parent_id = ?1;");
        let address = self
            .conn
            .query_row(&sql, params![parent_id], parse_address_row)
            .optional()?;
        Ok(address)
    }
}

fn join_table(entity: EntityType) -> CommandResult<(&'static str, &'static str)> {
    match entity {
        EntityType::Child => Ok(("parent_child", "child_id")),
        EntityType::Skill => Ok(("parent_skill", "skill_id")),
        EntityType::Freetime => Ok(("parent_freetime", "freetime_id")),
        EntityType::Parent | EntityType::Address => Err(CommandError::Link(format!(
            "{entity} rows are not linked through a join table"
        ))),
    }
}

fn select_columns(entity: EntityType) -> &'static str {
    match entity {
        EntityType::Parent => PARENT_COLUMNS,
        EntityType::Child => CHILD_COLUMNS,
        EntityType::Skill => SKILL_COLUMNS,
        EntityType::Freetime => FREETIME_COLUMNS,
        EntityType::Address => ADDRESS_COLUMNS,
    }
}

fn parse_record(entity: EntityType, row: &Row<'_>) -> rusqlite::Result<Record> {
    match entity {
        EntityType::Parent => Ok(Record::Parent(Parent {
            id: row.get("id")?,
            first_name: row.get("first_name")?,
            second_name: row.get("second_name")?,
            created: row.get("created")?,
        })),
        EntityType::Child => Ok(Record::Child(Child {
            id: row.get("id")?,
            first_name: row.get("first_name")?,
            second_name: row.get("second_name")?,
            created: row.get("created")?,
        })),
        EntityType::Skill => Ok(Record::Skill(Skill {
            id: row.get("id")?,
            name: row.get("name")?,
            created: row.get("created")?,
        })),
        EntityType::Freetime => {
            let am_start: i64 = row.get("am_start")?;
            let am_end: i64 = row.get("am_end")?;
            let pm_start: i64 = row.get("pm_start")?;
            let pm_end: i64 = row.get("pm_end")?;
            Ok(Record::Freetime(Freetime {
                id: row.get("id")?,
                day: row.get("day")?,
                am_start,
                am_end,
                pm_start,
                pm_end,
                created: row.get("created")?,
                period: Freetime::derive_period(am_start, am_end, pm_start, pm_end),
            }))
        }
        EntityType::Address => Ok(Record::Address(parse_address_row(row)?)),
    }
}

fn parse_address_row(row: &Row<'_>) -> rusqlite::Result<Address> {
    Ok(Address {
        id: row.get("id")?,
        line01: row.get("line01")?,
        line02: row.get("line02")?,
        village: row.get("village")?,
        city: row.get("city")?,
        postcode: row.get("postcode")?,
        country: row.get("country")?,
        home_telephone: row.get("home_telephone")?,
        mobile_telephone: row.get("mobile_telephone")?,
        other_telephone: row.get("other_telephone")?,
        home_email: row.get("home_email")?,
        work_email: row.get("work_email")?,
        other_email: row.get("other_email")?,
        parent_id: row.get("parent_id")?,
        created: row.get("created")?,
    })
}
