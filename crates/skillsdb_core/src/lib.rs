//! Core command/query interpretation engine for skillsdb.
//! This crate is the single source of truth for business invariants.

pub mod command;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod link;
pub mod logging;
pub mod model;
pub mod schema;
pub mod store;

pub use command::resolver::{resolve, CommandFlags, Operation};
pub use db::{open_db, open_db_in_memory, DbError};
pub use dispatch::{dispatch, CommandOutcome, CommandRequest};
pub use error::{CommandError, CommandResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::{Address, Child, EntityType, Freetime, Parent, Period, Record, Skill};
pub use store::{RecordStore, SqliteRecordStore};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
