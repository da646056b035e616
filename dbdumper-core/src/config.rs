//! Dump configuration.
//!
//! [`DumpConfig`] is the builder value handed to a dumper. It holds the
//! connection parameters, the table filter, raw extra options, the output
//! mode and the engine-specific flag groups.
//!
//! # Module Structure
//! - `dump`: the `DumpConfig` builder and its validation
//! - `tables`: include/exclude table lists
//! - `options`: per-engine flag groups
//! - `url`: populating a configuration from a database URL

mod dump;
mod options;
mod tables;
mod url;

pub use dump::DumpConfig;
pub use options::{GTID_PURGED_AUTO, MongoOptions, MySqlOptions, PostgresOptions};
pub use tables::{TableFilter, TableList};
