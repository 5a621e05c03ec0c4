//! Static per-entity schema tables.
//!
//! # Responsibility
//! - Enumerate the assignable field names for each entity type.
//! - Expose the relationship-role key an entity accepts on create/update.
//!
//! # Invariants
//! - Bookkeeping columns (`id`, `created`, `parent_id`) are never listed as
//!   assignable fields.
//! - The tables are enumerated in source; nothing is discovered at runtime.

use crate::model::EntityType;

const PARENT_FIELDS: &[&str] = &["first_name", "second_name"];
const CHILD_FIELDS: &[&str] = &["first_name", "second_name"];
const SKILL_FIELDS: &[&str] = &["name"];
const FREETIME_FIELDS: &[&str] = &["day", "am_start", "am_end", "pm_start", "pm_end"];
const ADDRESS_FIELDS: &[&str] = &[
    "line01",
    "line02",
    "village",
    "city",
    "postcode",
    "country",
    "home_telephone",
    "mobile_telephone",
    "other_telephone",
    "home_email",
    "work_email",
    "other_email",
];

const FREETIME_TIME_FIELDS: &[&str] = &["am_start", "am_end", "pm_start", "pm_end"];

/// Ordered set of field names valid for direct assignment on an entity.
pub fn fields_of(entity: EntityType) -> &'static [&'static str] {
    match entity {
        EntityType::Parent => PARENT_FIELDS,
        EntityType::Child => CHILD_FIELDS,
        EntityType::Skill => SKILL_FIELDS,
        EntityType::Freetime => FREETIME_FIELDS,
        EntityType::Address => ADDRESS_FIELDS,
    }
}

/// Resolves a user-supplied key to its canonical static field name.
pub fn canonical_field(entity: EntityType, key: &str) -> Option<&'static str> {
    fields_of(entity).iter().copied().find(|field| *field == key)
}

/// Whether a field holds a time-of-day value parsed from `hh:mm`.
pub fn is_time_field(entity: EntityType, field: &str) -> bool {
    entity == EntityType::Freetime && FREETIME_TIME_FIELDS.contains(&field)
}

/// Relationship-role key accepted alongside plain field assignments.
///
/// Only Parent carries one: `partner=<id>` references another parent row.
pub fn relation_role(entity: EntityType) -> Option<&'static str> {
    match entity {
        EntityType::Parent => Some("partner"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{canonical_field, fields_of, is_time_field, relation_role};
    use crate::model::EntityType;

    #[test]
    fn every_entity_has_at_least_one_assignable_field() {
        for entity in EntityType::ALL {
            assert!(!fields_of(entity).is_empty(), "{entity} has no fields");
        }
    }

    #[test]
    fn bookkeeping_columns_are_not_assignable() {
        for entity in EntityType::ALL {
            for reserved in ["id", "created", "parent_id"] {
                assert!(canonical_field(entity, reserved).is_none());
            }
        }
    }

    #[test]
    fn time_fields_are_freetime_only() {
        assert!(is_time_field(EntityType::Freetime, "am_start"));
        assert!(!is_time_field(EntityType::Freetime, "day"));
        assert!(!is_time_field(EntityType::Address, "am_start"));
    }

    #[test]
    fn only_parent_accepts_a_relationship_role() {
        assert_eq!(relation_role(EntityType::Parent), Some("partner"));
        for entity in [
            EntityType::Child,
            EntityType::Skill,
            EntityType::Freetime,
            EntityType::Address,
        ] {
            assert_eq!(relation_role(entity), None);
        }
    }
}
