//! Entity types and typed row structs.
//!
//! # Responsibility
//! - Enumerate the entity tables as a closed set.
//! - Define one typed row struct per table plus the unifying [`Record`].
//!
//! # Invariants
//! - `id` and `created` are store-assigned bookkeeping, never user fields.
//! - `Freetime::period` is derived from window durations, never stored.

use chrono::Local;
use serde::Serialize;

/// Closed enumeration of the entity tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Parent,
    Child,
    Skill,
    Freetime,
    Address,
}

impl EntityType {
    /// All entity types in table order, for exhaustive validation tables.
    pub const ALL: [EntityType; 5] = [
        EntityType::Parent,
        EntityType::Child,
        EntityType::Skill,
        EntityType::Freetime,
        EntityType::Address,
    ];

    /// SQL table name backing this entity.
    pub fn table_name(self) -> &'static str {
        match self {
            EntityType::Parent => "parent",
            EntityType::Child => "child",
            EntityType::Skill => "skill",
            EntityType::Freetime => "freetime",
            EntityType::Address => "address",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table_name())
    }
}

/// Value of a single assignable field, as produced by token parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// Epoch milliseconds; used for the freetime window columns.
    Timestamp(i64),
    /// Plain integer column, used for relationship reference columns.
    Integer(i64),
}

impl From<FieldValue> for rusqlite::types::Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Text(text) => rusqlite::types::Value::Text(text),
            FieldValue::Timestamp(ms) | FieldValue::Integer(ms) => {
                rusqlite::types::Value::Integer(ms)
            }
        }
    }
}

/// Derived availability classification for a freetime row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Period {
    Day,
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
    #[serde(rename = "NA")]
    Na,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parent {
    pub id: i64,
    pub first_name: Option<String>,
    pub second_name: Option<String>,
    pub created: i64,
}

impl Parent {
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.second_name.as_deref().unwrap_or("")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Child {
    pub id: i64,
    pub first_name: Option<String>,
    pub second_name: Option<String>,
    pub created: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skill {
    pub id: i64,
    pub name: Option<String>,
    pub created: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Freetime {
    pub id: i64,
    pub day: Option<String>,
    pub am_start: i64,
    pub am_end: i64,
    pub pm_start: i64,
    pub pm_end: i64,
    pub created: i64,
    /// Derived from the window durations when the row is built or read.
    pub period: Period,
}

impl Freetime {
    /// Classifies availability from positive morning/afternoon durations.
    pub fn derive_period(am_start: i64, am_end: i64, pm_start: i64, pm_end: i64) -> Period {
        let am = am_end > am_start;
        let pm = pm_end > pm_start;
        match (am, pm) {
            (true, true) => Period::Day,
            (true, false) => Period::Am,
            (false, true) => Period::Pm,
            (false, false) => Period::Na,
        }
    }

    /// Default availability windows anchored to the current date:
    /// 09:00-12:00 and 13:00-17:00.
    pub fn default_windows() -> [(&'static str, i64); 4] {
        [
            ("am_start", time_of_day_ms(9, 0)),
            ("am_end", time_of_day_ms(12, 0)),
            ("pm_start", time_of_day_ms(13, 0)),
            ("pm_end", time_of_day_ms(17, 0)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Address {
    pub id: i64,
    pub line01: Option<String>,
    pub line02: Option<String>,
    pub village: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub country: String,
    pub home_telephone: Option<String>,
    pub mobile_telephone: Option<String>,
    pub other_telephone: Option<String>,
    pub home_email: Option<String>,
    pub work_email: Option<String>,
    pub other_email: Option<String>,
    /// Owning parent; stale after that parent is deleted (no cascade).
    pub parent_id: Option<i64>,
    pub created: i64,
}

/// One row from any entity table, for heterogeneous result sets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "entity")]
pub enum Record {
    Parent(Parent),
    Child(Child),
    Skill(Skill),
    Freetime(Freetime),
    Address(Address),
}

impl Record {
    pub fn entity_type(&self) -> EntityType {
        match self {
            Record::Parent(_) => EntityType::Parent,
            Record::Child(_) => EntityType::Child,
            Record::Skill(_) => EntityType::Skill,
            Record::Freetime(_) => EntityType::Freetime,
            Record::Address(_) => EntityType::Address,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Record::Parent(row) => row.id,
            Record::Child(row) => row.id,
            Record::Skill(row) => row.id,
            Record::Freetime(row) => row.id,
            Record::Address(row) => row.id,
        }
    }
}

/// Converts a wall-clock time on the current date to epoch milliseconds.
pub fn time_of_day_ms(hour: u32, minute: u32) -> i64 {
    let today = Local::now().date_naive();
    // hour/minute are validated upstream, so and_hms_opt cannot fail here.
    today
        .and_hms_opt(hour, minute, 0)
        .unwrap_or_else(|| today.and_hms_opt(0, 0, 0).expect("midnight is valid"))
        .and_utc()
        .timestamp_millis()
}
