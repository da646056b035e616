//! Core library for dbdumper.
//!
//! Builds shell command lines that run external dump binaries
//! (`mysqldump`, `mariadb-dump`, `pg_dump`, `mongodump`, `sqlite3`), runs
//! them, and checks that they produced a non-empty dump file.
//!
//! # Security Guarantees
//! - MySQL and PostgreSQL passwords never appear on a process argument list
//! - Temporary credentials files are owner-only and removed on every exit path
//! - Passwords are zeroized on drop and never logged
//! - The library never connects to a database server; the only database
//!   I/O is listing tables of a local SQLite file
//!
//! # Architecture
//! - [`DumpConfig`] is a consuming builder validated at setter time
//! - One generic command builder drives a per-engine strategy of ordered
//!   flag contributors
//! - All quoting and pipeline assembly lives in [`shell`]
//! - Process execution sits behind the [`CommandRunner`] trait
//!
//! # Example
//! ```rust
//! use dbdumper_core::{Compressor, DbDumper, DumpConfig, ShellFlavor};
//!
//! # async fn example() -> dbdumper_core::Result<()> {
//! let config = DumpConfig::postgres()
//!     .with_shell(ShellFlavor::Posix)
//!     .with_database("app")
//!     .with_username("backup")
//!     .use_compressor(Compressor::Gzip)?;
//!
//! let command = DbDumper::new(config).dump_command("app.sql.gz", "unused").await?;
//! assert!(command.contains("| gzip > \"app.sql.gz\""));
//! # Ok(())
//! # }
//! ```

pub mod compression;
pub mod config;
pub mod dumper;
pub mod error;
pub mod logging;
pub mod models;
pub mod process;
pub mod security;
pub mod shell;
pub mod verify;

// Re-export commonly used types
pub use compression::Compressor;
pub use config::{DumpConfig, TableFilter, TableList};
pub use dumper::DbDumper;
pub use error::{DumpError, Result};
pub use logging::init_logging;
pub use models::{DatabaseType, DumpContents, MySqlSslMode, OutputMode};
pub use process::{CommandRunner, ProcessOutput, ShellCommand, ShellRunner};
pub use shell::ShellFlavor;
