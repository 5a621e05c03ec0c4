//! skillsdb command-line shell.
//!
//! # Responsibility
//! - Parse flags with clap and hand a raw flag/token set to the core
//!   interpretation engine.
//! - Print results as JSON lines; exit nonzero on any command error.
//!
//! Flag validation (exactly one table, exactly one operation, pid/rid
//! rules) lives in the core resolver so that every front end shares it.

use clap::Parser;
use skillsdb_core::{
    default_log_level, dispatch, init_logging, open_db, CommandFlags, CommandOutcome,
    CommandRequest,
};
use std::path::PathBuf;
use std::process::ExitCode;

/// Manage people, their skills, availability and addresses.
#[derive(Parser, Debug)]
#[command(name = "skillsdb", version, about)]
struct Cli {
    /// Work on the parent table
    #[arg(long)]
    parent: bool,
    /// Work on the child table
    #[arg(long)]
    child: bool,
    /// Work on the skill table
    #[arg(long)]
    skill: bool,
    /// Work on the freetime table
    #[arg(long)]
    freetime: bool,
    /// Work on the address table
    #[arg(long)]
    address: bool,

    /// Add a record
    #[arg(long)]
    add: bool,
    /// Delete a record
    #[arg(long)]
    delete: bool,
    /// Modify a record
    #[arg(long)]
    modify: bool,
    /// Search for records
    #[arg(long)]
    search: bool,

    /// Owning parent identifier
    #[arg(long)]
    pid: Option<i64>,
    /// Target record identifier
    #[arg(long)]
    rid: Option<i64>,

    /// Database file
    #[arg(long, default_value = "skillsdb.sqlite")]
    db: PathBuf,
    /// Absolute log directory; file logging is disabled when omitted
    #[arg(long)]
    log_dir: Option<PathBuf>,
    /// Log level (trace|debug|info|warn|error)
    #[arg(long)]
    log_level: Option<String>,

    /// `key=value` assignments, or `key=value,operator` plus AND/OR/NOT
    /// connectives for --search
    #[arg(value_name = "TOKEN")]
    tokens: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(message) = init_logging(level, &log_dir.display().to_string()) {
            eprintln!("skillsdb: {message}");
            return ExitCode::from(2);
        }
    }

    let mut conn = match open_db(&cli.db) {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("skillsdb: {err}");
            return ExitCode::FAILURE;
        }
    };

    let request = CommandRequest {
        flags: CommandFlags {
            parent: cli.parent,
            child: cli.child,
            skill: cli.skill,
            freetime: cli.freetime,
            address: cli.address,
            add: cli.add,
            delete: cli.delete,
            modify: cli.modify,
            search: cli.search,
            pid: cli.pid,
            rid: cli.rid,
        },
        tokens: cli.tokens,
    };

    match dispatch(&mut conn, &request) {
        Ok(CommandOutcome::Matched { records }) => {
            for record in &records {
                match serde_json::to_string(record) {
                    Ok(line) => println!("{line}"),
                    Err(err) => {
                        eprintln!("skillsdb: failed to render record: {err}");
                        return ExitCode::FAILURE;
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Ok(outcome) => match serde_json::to_string(&outcome) {
            Ok(line) => {
                println!("{line}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("skillsdb: failed to render outcome: {err}");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            eprintln!("skillsdb: {err}");
            ExitCode::FAILURE
        }
    }
}
