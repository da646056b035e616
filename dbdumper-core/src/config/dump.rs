//! The dump configuration builder.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

use super::options::{MongoOptions, MySqlOptions, PostgresOptions};
use super::tables::{TableFilter, TableList};
use crate::compression::Compressor;
use crate::error::DumpError;
use crate::models::{DatabaseType, DumpContents, MySqlSslMode, OutputMode};
use crate::security::Credentials;
use crate::shell::ShellFlavor;

const DEFAULT_HOST: &str = "localhost";

/// Everything needed to build and run one dump command.
///
/// Created fresh per dump and mutated through consuming setters. Setters
/// that can conflict with earlier state return a `Result`.
///
/// The password is held in a [`Credentials`] container; `Debug` output
/// never shows it.
///
/// # Example
/// ```rust
/// use dbdumper_core::{DatabaseType, DumpConfig};
///
/// let config = DumpConfig::new(DatabaseType::MySQL)
///     .with_database("shop")
///     .with_username("root")
///     .with_password("secret")
///     .exclude_tables("sessions, cache")?;
///
/// assert_eq!(config.database_name(), "shop");
/// assert_eq!(config.port(), Some(3306));
/// assert!(!format!("{:?}", config).contains("secret"));
/// # Ok::<(), dbdumper_core::DumpError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DumpConfig {
    pub(crate) engine: DatabaseType,
    pub(crate) host: String,
    pub(crate) port: Option<u16>,
    pub(crate) socket: String,
    pub(crate) credentials: Credentials,
    pub(crate) database: String,
    pub(crate) dump_binary_path: String,
    pub(crate) timeout: Option<Duration>,
    pub(crate) shell: ShellFlavor,
    pub(crate) tables: TableFilter,
    pub(crate) extra_options: Vec<String>,
    pub(crate) extra_options_after_db_name: Vec<String>,
    pub(crate) output: OutputMode,
    pub(crate) contents: DumpContents,
    pub(crate) all_databases: bool,
    pub(crate) database_from_extra_option: bool,
    pub(crate) mysql: MySqlOptions,
    pub(crate) postgres: PostgresOptions,
    pub(crate) mongodb: MongoOptions,
}

/// `--databases <name>` at the start of a MySQL extra option.
///
/// Uses `OnceLock` so the pattern is compiled once.
#[allow(clippy::expect_used)]
fn databases_option() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^--databases (\S+)").expect("Invalid --databases pattern"))
}

impl DumpConfig {
    /// Creates a configuration for `engine` with default flags.
    pub fn new(engine: DatabaseType) -> Self {
        Self {
            engine,
            host: DEFAULT_HOST.to_string(),
            port: None,
            socket: String::new(),
            credentials: Credentials::default(),
            database: String::new(),
            dump_binary_path: String::new(),
            timeout: None,
            shell: ShellFlavor::host(),
            tables: TableFilter::All,
            extra_options: Vec::new(),
            extra_options_after_db_name: Vec::new(),
            output: OutputMode::Overwrite,
            contents: DumpContents::SchemaAndData,
            all_databases: false,
            database_from_extra_option: false,
            mysql: MySqlOptions::default(),
            postgres: PostgresOptions::default(),
            mongodb: MongoOptions::default(),
        }
    }

    /// Shorthand for `DumpConfig::new(DatabaseType::MySQL)`.
    pub fn mysql() -> Self {
        Self::new(DatabaseType::MySQL)
    }

    /// Shorthand for `DumpConfig::new(DatabaseType::MariaDB)`.
    pub fn mariadb() -> Self {
        Self::new(DatabaseType::MariaDB)
    }

    /// Shorthand for `DumpConfig::new(DatabaseType::PostgreSQL)`.
    pub fn postgres() -> Self {
        Self::new(DatabaseType::PostgreSQL)
    }

    /// Shorthand for `DumpConfig::new(DatabaseType::MongoDB)`.
    pub fn mongodb() -> Self {
        Self::new(DatabaseType::MongoDB)
    }

    /// Shorthand for `DumpConfig::new(DatabaseType::SQLite)`.
    pub fn sqlite() -> Self {
        Self::new(DatabaseType::SQLite)
    }

    // --- connection ---

    /// Builder method to set the host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Builder method to set the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Connects through a unix socket. MySQL omits `host` from its
    /// credentials file when a socket is set.
    pub fn with_socket(mut self, socket: impl Into<String>) -> Self {
        self.socket = socket.into();
        self
    }

    /// Builder method to set the username.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.credentials.set_username(username.into());
        self
    }

    /// Builder method to set the password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.credentials.set_password(password.into());
        self
    }

    /// Sets the database name, or the file path for SQLite.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Directory holding the dump binary. A trailing `/` is added when
    /// missing; an empty path means "search `PATH`".
    pub fn with_dump_binary_path(mut self, path: impl Into<String>) -> Self {
        let mut path = path.into();
        if !path.is_empty() && !path.ends_with('/') {
            path.push('/');
        }
        self.dump_binary_path = path;
        self
    }

    /// Kills the dump process if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Shell convention of the environment that runs the command.
    pub fn with_shell(mut self, shell: ShellFlavor) -> Self {
        self.shell = shell;
        self
    }

    // --- tables ---

    /// Dumps only the given tables.
    ///
    /// # Errors
    /// Returns `DumpError::ConflictingParameters` if excluded tables are
    /// already set.
    pub fn include_tables(mut self, tables: impl Into<TableList>) -> crate::Result<Self> {
        if !self.tables.excluded().is_empty() {
            return Err(DumpError::conflicting("includeTables", "excludeTables"));
        }
        let tables = tables.into();
        self.tables = if tables.is_empty() {
            TableFilter::All
        } else {
            TableFilter::Include(tables.into_vec())
        };
        Ok(self)
    }

    /// Dumps every table except the given ones.
    ///
    /// # Errors
    /// Returns `DumpError::ConflictingParameters` if included tables are
    /// already set.
    pub fn exclude_tables(mut self, tables: impl Into<TableList>) -> crate::Result<Self> {
        if !self.tables.included().is_empty() {
            return Err(DumpError::conflicting("excludeTables", "includeTables"));
        }
        let tables = tables.into();
        self.tables = if tables.is_empty() {
            TableFilter::All
        } else {
            TableFilter::Exclude(tables.into_vec())
        };
        Ok(self)
    }

    // --- raw options ---

    /// Appends a raw option placed before the database name. Empty
    /// options are ignored.
    ///
    /// For MySQL and MariaDB, an option containing `--all-databases` or
    /// starting with `--databases <name>` supplies the database itself, so
    /// no database name token is emitted.
    pub fn add_extra_option(mut self, option: impl Into<String>) -> Self {
        let option = option.into();
        if option.is_empty() {
            return self;
        }

        if self.engine.is_mysql_family() {
            if option.contains("--all-databases") {
                self.all_databases = true;
                self.database_from_extra_option = true;
            }
            if let Some(captures) = databases_option().captures(&option) {
                self.database = captures[1].to_string();
                self.database_from_extra_option = true;
            }
        }

        self.extra_options.push(option);
        self
    }

    /// Appends a raw option placed after the database name. Empty options
    /// are ignored.
    pub fn add_extra_option_after_db_name(mut self, option: impl Into<String>) -> Self {
        let option = option.into();
        if !option.is_empty() {
            self.extra_options_after_db_name.push(option);
        }
        self
    }

    // --- output ---

    /// Pipes the dump through `compressor`.
    ///
    /// # Errors
    /// Returns `DumpError::ConflictingParameters` in append mode.
    pub fn use_compressor(mut self, compressor: Compressor) -> crate::Result<Self> {
        if self.output == OutputMode::Append {
            return Err(DumpError::conflicting("compress", "append mode"));
        }
        self.output = OutputMode::Compressed(compressor);
        Ok(self)
    }

    /// Appends to the output file (`>>`) instead of truncating it.
    ///
    /// # Errors
    /// Returns `DumpError::ConflictingParameters` when a compressor is set.
    pub fn use_append_mode(mut self) -> crate::Result<Self> {
        if matches!(self.output, OutputMode::Compressed(_)) {
            return Err(DumpError::conflicting("append mode", "compress"));
        }
        self.output = OutputMode::Append;
        Ok(self)
    }

    /// Dumps rows only.
    ///
    /// # Errors
    /// Returns `DumpError::ConflictingParameters` after `do_not_dump_data`.
    pub fn do_not_create_tables(mut self) -> crate::Result<Self> {
        if self.contents == DumpContents::SchemaOnly {
            return Err(DumpError::conflicting("createTables", "includeData"));
        }
        self.contents = DumpContents::DataOnly;
        Ok(self)
    }

    /// Dumps table definitions only.
    ///
    /// # Errors
    /// Returns `DumpError::ConflictingParameters` after `do_not_create_tables`.
    pub fn do_not_dump_data(mut self) -> crate::Result<Self> {
        if self.contents == DumpContents::DataOnly {
            return Err(DumpError::conflicting("includeData", "createTables"));
        }
        self.contents = DumpContents::SchemaOnly;
        Ok(self)
    }

    // --- MySQL / MariaDB ---

    /// `--skip-comments` (default).
    pub fn skip_comments(mut self) -> Self {
        self.mysql.skip_comments = true;
        self
    }

    /// Keeps comments in the dump.
    pub fn dont_skip_comments(mut self) -> Self {
        self.mysql.skip_comments = false;
        self
    }

    /// `--extended-insert` (default).
    pub fn use_extended_inserts(mut self) -> Self {
        self.mysql.use_extended_inserts = true;
        self
    }

    /// `--skip-extended-insert`: one `INSERT` per row.
    pub fn dont_use_extended_inserts(mut self) -> Self {
        self.mysql.use_extended_inserts = false;
        self
    }

    /// `--single-transaction`.
    pub fn use_single_transaction(mut self) -> Self {
        self.mysql.use_single_transaction = true;
        self
    }

    /// Removes `--single-transaction`.
    pub fn dont_use_single_transaction(mut self) -> Self {
        self.mysql.use_single_transaction = false;
        self
    }

    /// `--skip-lock-tables`.
    pub fn skip_lock_tables(mut self) -> Self {
        self.mysql.skip_lock_tables = true;
        self
    }

    /// Removes `--skip-lock-tables`.
    pub fn dont_skip_lock_tables(mut self) -> Self {
        self.mysql.skip_lock_tables = false;
        self
    }

    /// `--column-statistics=0`, for MySQL 8 clients against older servers.
    pub fn disable_column_statistics(mut self) -> Self {
        self.mysql.disable_column_statistics = true;
        self
    }

    /// `--quick`.
    pub fn use_quick(mut self) -> Self {
        self.mysql.use_quick = true;
        self
    }

    /// Removes `--quick`.
    pub fn dont_use_quick(mut self) -> Self {
        self.mysql.use_quick = false;
        self
    }

    /// `--routines`.
    pub fn include_routines(mut self) -> Self {
        self.mysql.include_routines = true;
        self
    }

    /// `--default-character-set=<charset>`.
    pub fn with_default_character_set(mut self, charset: impl Into<String>) -> Self {
        self.mysql.default_character_set = charset.into();
        self
    }

    /// `--set-gtid-purged=<value>`; `AUTO` emits nothing.
    pub fn with_gtid_purged(mut self, value: impl Into<String>) -> Self {
        self.mysql.gtid_purged = value.into();
        self
    }

    /// MySQL and MariaDB: dumps the definitions of the given tables but
    /// none of their rows.
    /// Accepts the same inputs as [`DumpConfig::exclude_tables`] and can be
    /// combined with either table list.
    pub fn exclude_tables_data(mut self, tables: impl Into<TableList>) -> Self {
        self.mysql.exclude_tables_data = tables.into().into_vec();
        self
    }

    /// Strips `AUTO_INCREMENT=<n>` from the dumped table definitions.
    ///
    /// The pipeline's exit status is that of `sed`, not `mysqldump`, so a
    /// failing dump is only caught by the dump file check afterwards.
    pub fn skip_auto_increment(mut self) -> Self {
        self.mysql.skip_auto_increment = true;
        self
    }

    /// Keeps `AUTO_INCREMENT=<n>` (default).
    pub fn dont_skip_auto_increment(mut self) -> Self {
        self.mysql.skip_auto_increment = false;
        self
    }

    /// Adds an SSL line to the MySQL credentials file.
    pub fn with_ssl_mode(mut self, mode: MySqlSslMode) -> Self {
        self.mysql.ssl_mode = Some(mode);
        self
    }

    /// MariaDB: drops the sandbox-mode first line (`|tail +2`) so older
    /// clients can import the dump.
    ///
    /// As with [`DumpConfig::skip_auto_increment`], the pipeline reports the
    /// exit status of `tail`, not `mariadb-dump`.
    pub fn without_sandbox_mode(mut self) -> Self {
        self.mysql.sandbox_mode = false;
        self
    }

    // --- PostgreSQL ---

    /// `--inserts` instead of `COPY`.
    pub fn use_inserts(mut self) -> Self {
        self.postgres.use_inserts = true;
        self
    }

    /// Back to `COPY` (default).
    pub fn dont_use_inserts(mut self) -> Self {
        self.postgres.use_inserts = false;
        self
    }

    // --- MongoDB ---

    /// `--collection <name>`.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.mongodb.collection = Some(collection.into()).filter(|c| !c.is_empty());
        self
    }

    /// `--authenticationDatabase <name>`.
    pub fn with_authentication_database(mut self, database: impl Into<String>) -> Self {
        self.mongodb.authentication_database = Some(database.into()).filter(|d| !d.is_empty());
        self
    }

    // --- getters ---

    /// Engine this configuration targets.
    pub const fn engine(&self) -> DatabaseType {
        self.engine
    }

    /// Database name, including one taken from `--databases <name>`.
    pub fn database_name(&self) -> &str {
        &self.database
    }

    /// Configured host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Configured port, falling back to the engine default.
    pub fn port(&self) -> Option<u16> {
        self.port.or_else(|| self.engine.default_port())
    }

    /// Configured socket, empty when unset.
    pub fn socket(&self) -> &str {
        &self.socket
    }

    /// Configured username, empty when unset.
    pub fn username(&self) -> &str {
        self.credentials.username()
    }

    /// Process timeout, if any.
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Shell convention used for quoting and execution.
    pub const fn shell(&self) -> ShellFlavor {
        self.shell
    }

    /// Output redirect mode.
    pub const fn output_mode(&self) -> OutputMode {
        self.output
    }

    /// Schema/data selection.
    pub const fn contents(&self) -> DumpContents {
        self.contents
    }

    /// Table include/exclude filter.
    pub const fn tables(&self) -> &TableFilter {
        &self.tables
    }

    /// Raw options placed before the database name.
    pub fn extra_options(&self) -> &[String] {
        &self.extra_options
    }

    /// Raw options placed after the database name.
    pub fn extra_options_after_db_name(&self) -> &[String] {
        &self.extra_options_after_db_name
    }

    /// Extension of the configured compressor (e.g. `.gz`), if any.
    pub const fn compressor_extension(&self) -> Option<&'static str> {
        match self.output {
            OutputMode::Compressed(compressor) => Some(compressor.extension()),
            _ => None,
        }
    }

    // --- validation ---

    /// Checks the fields the engine needs before a dump can start.
    ///
    /// # Errors
    /// Returns `DumpError::EmptyParameter` naming the first empty field
    /// (`userName`, `host`, or `dbName`).
    pub fn guard_against_incomplete_credentials(&self) -> crate::Result<()> {
        let required: &[(&str, &str)] = match self.engine {
            DatabaseType::MySQL | DatabaseType::MariaDB => &[
                ("userName", self.credentials.username()),
                ("host", &self.host),
            ],
            DatabaseType::PostgreSQL => &[
                ("userName", self.credentials.username()),
                ("dbName", &self.database),
                ("host", &self.host),
            ],
            DatabaseType::MongoDB => &[("dbName", &self.database), ("host", &self.host)],
            DatabaseType::SQLite => &[("dbName", &self.database)],
        };

        if let Some((name, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            return Err(DumpError::empty_parameter(*name));
        }

        if self.engine.is_mysql_family() && !self.all_databases && self.database.is_empty() {
            return Err(DumpError::empty_parameter("dbName"));
        }

        Ok(())
    }
}
