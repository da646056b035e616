//! Building and running dump commands.
//!
//! One generic builder turns a [`DumpConfig`] into a shell command line.
//! Each engine supplies a strategy: an ordered list of flag contributors
//! (pure functions from the configuration to zero or more tokens), the pipe
//! filters appended after them, and any extra validation. The builder joins
//! the tokens, appends the filters and finishes with the output redirect.
//!
//! # Module Structure
//! - `mysql`: MySQL and MariaDB (`mysqldump`, `mariadb-dump`)
//! - `postgres`: PostgreSQL (`pg_dump`)
//! - `mongodb`: MongoDB (`mongodump`)
//! - `sqlite`: SQLite (`sqlite3 .dump`)

mod mongodb;
mod mysql;
mod postgres;
mod sqlite;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::config::DumpConfig;
use crate::models::{DatabaseType, OutputMode};
use crate::process::{CommandRunner, ShellCommand, ShellRunner};
use crate::security::CredentialsChannel;
use crate::shell::{self, Redirect};
use crate::verify::verify_dump;

/// Inputs available to flag contributors besides the configuration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CommandContext<'a> {
    pub(crate) config: &'a DumpConfig,
    pub(crate) credentials_file: Option<&'a Path>,
    /// Tables named on the command line, already resolved
    pub(crate) tables: &'a [String],
}

impl CommandContext<'_> {
    /// The quoted dump binary, honoring the install directory.
    pub(crate) fn binary(&self) -> String {
        shell::binary(
            self.config.shell,
            &self.config.dump_binary_path,
            self.config.engine.binary_name(),
        )
    }

    pub(crate) fn quote(&self, value: &str) -> String {
        shell::quote(self.config.shell, value)
    }

    pub(crate) fn quote_if_needed(&self, value: &str) -> String {
        shell::quote_if_needed(self.config.shell, value)
    }
}

/// Emits zero or more command tokens.
pub(crate) type Contributor = fn(&CommandContext<'_>) -> Vec<String>;

/// Emits a pipe suffix, including its leading separator.
pub(crate) type Filter = fn(&CommandContext<'_>) -> Option<String>;

/// Shorthand for a contributor that emits one token when `condition` holds.
pub(crate) fn flag(condition: bool, token: &str) -> Vec<String> {
    if condition {
        vec![token.to_string()]
    } else {
        Vec::new()
    }
}

/// Engine-specific part of command construction.
#[async_trait]
pub(crate) trait EngineStrategy: Send + Sync {
    /// Token contributors, in emission order.
    fn contributors(&self) -> &'static [Contributor];

    /// Pipe filters appended after the base command.
    fn filters(&self) -> &'static [Filter] {
        &[]
    }

    /// Rejects configurations this engine cannot express.
    fn validate(&self, _config: &DumpConfig) -> crate::Result<()> {
        Ok(())
    }

    /// Tables to name on the command line.
    async fn resolve_tables(&self, config: &DumpConfig) -> crate::Result<Vec<String>> {
        Ok(config.tables.included().to_vec())
    }
}

fn strategy_for(engine: DatabaseType) -> &'static dyn EngineStrategy {
    match engine {
        DatabaseType::MySQL => &mysql::MySqlStrategy,
        DatabaseType::MariaDB => &mysql::MariaDbStrategy,
        DatabaseType::PostgreSQL => &postgres::PostgresStrategy,
        DatabaseType::MongoDB => &mongodb::MongoStrategy,
        DatabaseType::SQLite => &sqlite::SqliteStrategy,
    }
}

fn render(strategy: &dyn EngineStrategy, ctx: &CommandContext<'_>, dump_file: &str) -> String {
    let tokens: Vec<String> = strategy
        .contributors()
        .iter()
        .flat_map(|contribute| contribute(ctx))
        .collect();
    let mut command = tokens.join(" ");

    for filter in strategy.filters() {
        if let Some(suffix) = filter(ctx) {
            command.push_str(&suffix);
        }
    }

    let mode = match ctx.config.output {
        OutputMode::Overwrite => Redirect::Truncate,
        OutputMode::Append => Redirect::Append,
        OutputMode::Compressed(compressor) => Redirect::Compress(compressor.command()),
    };
    shell::redirect(ctx.config.shell, &command, dump_file, mode)
}

/// Builds dump commands for a configuration and runs them.
///
/// # Example
/// ```rust,no_run
/// use dbdumper_core::{DbDumper, DumpConfig};
///
/// # async fn example() -> dbdumper_core::Result<()> {
/// let config = DumpConfig::mysql()
///     .with_database("shop")
///     .with_username("root")
///     .with_password("secret");
///
/// DbDumper::new(config).dump_to_file("shop.sql").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DbDumper {
    config: DumpConfig,
    runner: Arc<dyn CommandRunner>,
}

impl std::fmt::Debug for DbDumper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DbDumper")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DbDumper {
    /// Creates a dumper that runs commands with [`ShellRunner`].
    pub fn new(config: DumpConfig) -> Self {
        Self {
            config,
            runner: Arc::new(ShellRunner),
        }
    }

    /// Replaces the process runner.
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// The configuration this dumper was built from.
    pub const fn config(&self) -> &DumpConfig {
        &self.config
    }

    fn strategy(&self) -> &'static dyn EngineStrategy {
        strategy_for(self.config.engine)
    }

    /// Tables that will be named on the command line.
    ///
    /// For SQLite with only excluded tables this opens the database file
    /// and lists its tables.
    ///
    /// # Errors
    /// Returns `DumpError::TableEnumeration` if the SQLite file cannot be
    /// read, or `DumpError::UnsupportedFeature` without the `sqlite`
    /// feature.
    pub async fn tables_to_dump(&self) -> crate::Result<Vec<String>> {
        self.strategy().resolve_tables(&self.config).await
    }

    /// Builds the command line from already resolved tables. Performs no
    /// I/O, so the result depends only on the arguments and the
    /// configuration.
    ///
    /// # Errors
    /// Returns `DumpError::EmptyParameter` for missing required fields and
    /// `DumpError::Configuration` for options the engine cannot express.
    pub fn command_line(
        &self,
        dump_file: impl AsRef<Path>,
        credentials_file: Option<&Path>,
        tables: &[String],
    ) -> crate::Result<String> {
        self.config.guard_against_incomplete_credentials()?;
        let strategy = self.strategy();
        strategy.validate(&self.config)?;

        let ctx = CommandContext {
            config: &self.config,
            credentials_file,
            tables,
        };
        Ok(render(strategy, &ctx, &dump_file.as_ref().to_string_lossy()))
    }

    /// Builds the command line that dumps into `dump_file`, reading
    /// credentials from `credentials_file` where the engine uses one.
    ///
    /// # Errors
    /// As [`DbDumper::tables_to_dump`] and [`DbDumper::command_line`].
    ///
    /// # Example
    /// ```rust
    /// use dbdumper_core::{DbDumper, DumpConfig, ShellFlavor};
    ///
    /// # async fn example() -> dbdumper_core::Result<()> {
    /// let config = DumpConfig::mysql()
    ///     .with_shell(ShellFlavor::Posix)
    ///     .with_database("dbname")
    ///     .with_username("username")
    ///     .with_password("password");
    ///
    /// let command = DbDumper::new(config)
    ///     .dump_command("dump.sql", "credentials.txt")
    ///     .await?;
    /// assert_eq!(
    ///     command,
    ///     r#"'mysqldump' --defaults-extra-file="credentials.txt" --skip-comments --extended-insert dbname > "dump.sql""#
    /// );
    /// # Ok(())
    /// # }
    /// ```
    pub async fn dump_command(
        &self,
        dump_file: impl AsRef<Path>,
        credentials_file: impl AsRef<Path>,
    ) -> crate::Result<String> {
        let tables = self.tables_to_dump().await?;
        self.command_line(dump_file, Some(credentials_file.as_ref()), &tables)
    }

    /// Dumps the database into `dump_file` and returns the file size.
    ///
    /// Missing required fields are reported before any process is spawned.
    /// The temporary credentials file is removed on every exit path.
    ///
    /// # Errors
    /// - `DumpError::EmptyParameter` / `DumpError::Configuration` before
    ///   the dump starts
    /// - `DumpError::Io` if the credentials file or the shell cannot be
    ///   created
    /// - `DumpError::ProcessFailed`, `DumpError::DumpFileNotCreated`,
    ///   `DumpError::DumpFileEmpty` after it finishes
    pub async fn dump_to_file(&self, dump_file: impl AsRef<Path>) -> crate::Result<u64> {
        let dump_file = dump_file.as_ref();
        self.config.guard_against_incomplete_credentials()?;
        self.strategy().validate(&self.config)?;

        info!(
            "Starting {} dump of `{}` into {}",
            self.config.engine,
            self.config.database,
            dump_file.display()
        );

        let tables = self.tables_to_dump().await?;
        let credentials = CredentialsChannel::for_engine(self.config.engine).materialize(&self.config)?;
        let line = self.command_line(dump_file, credentials.path(), &tables)?;
        debug!("Dump command: {}", line);

        let command = ShellCommand::new(line, self.config.shell)
            .with_env(credentials.env().iter().cloned())
            .with_timeout(self.config.timeout);
        let output = self.runner.run(&command).await?;
        drop(credentials);

        match verify_dump(&output, dump_file).await {
            Ok(size) => {
                info!("Dump finished: {} ({} bytes)", dump_file.display(), size);
                Ok(size)
            }
            Err(e) => {
                error!("Dump into {} failed: {}", dump_file.display(), e);
                Err(e)
            }
        }
    }
}
