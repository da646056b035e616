//! Engine-specific option groups.
//!
//! Each group is stored on every [`DumpConfig`](super::DumpConfig) but only
//! read by the command strategy of its own engine.

use crate::models::MySqlSslMode;

/// `--set-gtid-purged` value that mysqldump uses when the flag is omitted.
pub const GTID_PURGED_AUTO: &str = "AUTO";

/// Flags for `mysqldump` and `mariadb-dump`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MySqlOptions {
    /// `--skip-comments`
    pub skip_comments: bool,
    /// `--extended-insert` when true, `--skip-extended-insert` otherwise
    pub use_extended_inserts: bool,
    /// `--single-transaction`
    pub use_single_transaction: bool,
    /// `--skip-lock-tables`
    pub skip_lock_tables: bool,
    /// `--column-statistics=0`
    pub disable_column_statistics: bool,
    /// `--quick`
    pub use_quick: bool,
    /// `--routines`
    pub include_routines: bool,
    /// `--default-character-set=<set>` when non-empty
    pub default_character_set: String,
    /// `--set-gtid-purged=<value>` unless it is `AUTO`
    pub gtid_purged: String,
    /// `--ignore-table-data=<db>.<table>` per entry: schema kept, rows skipped
    pub exclude_tables_data: Vec<String>,
    /// Strip `AUTO_INCREMENT=<n>` from table definitions with `sed`
    pub skip_auto_increment: bool,
    /// SSL line for the credentials file
    pub ssl_mode: Option<MySqlSslMode>,
    /// MariaDB only: keep the sandbox-mode first line of the dump
    pub sandbox_mode: bool,
}

impl Default for MySqlOptions {
    fn default() -> Self {
        Self {
            skip_comments: true,
            use_extended_inserts: true,
            use_single_transaction: false,
            skip_lock_tables: false,
            disable_column_statistics: false,
            use_quick: false,
            include_routines: false,
            default_character_set: String::new(),
            gtid_purged: GTID_PURGED_AUTO.to_string(),
            exclude_tables_data: Vec::new(),
            skip_auto_increment: false,
            ssl_mode: None,
            sandbox_mode: true,
        }
    }
}

/// Flags for `pg_dump`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostgresOptions {
    /// `--inserts`
    pub use_inserts: bool,
}

/// Flags for `mongodump`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MongoOptions {
    /// `--collection <name>`
    pub collection: Option<String>,
    /// `--authenticationDatabase <name>`
    pub authentication_database: Option<String>,
}
