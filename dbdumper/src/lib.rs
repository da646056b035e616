//! Library module for the dbdumper binary.
//!
//! Holds the command-line definition and the translation from parsed
//! flags into a [`DumpConfig`], so both can be tested without spawning
//! the binary. The entry point lives in `main.rs`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Args, Parser};
use dbdumper_core::error::redact_database_url;
use dbdumper_core::{Compressor, DatabaseType, DumpConfig, ShellFlavor};

/// Placeholder shown instead of a real credentials file by `--print-command`
pub const CREDENTIALS_PLACEHOLDER: &str = "<credentials-file>";

/// CLI argument structure
#[derive(Parser)]
#[command(name = "dbdumper")]
#[command(about = "Dump databases through their native dump binaries")]
#[command(version)]
#[command(long_about = "
dbdumper - Database dumps through native dump binaries

Builds and runs the shell command for mysqldump, mariadb-dump, pg_dump,
mongodump or sqlite3, then checks that a non-empty dump file was written.

SECURITY FEATURES:
- MySQL and PostgreSQL passwords travel through owner-only temporary files
- Temporary files are removed after every dump
- Passwords are redacted from logs and errors

SUPPORTED DATABASES:
- MySQL (mysql://)
- MariaDB (mariadb://)
- PostgreSQL (postgres:// or pgsql://)
- MongoDB (mongodb://)
- SQLite (sqlite:///path/to/file.db)

EXAMPLES:
  dbdumper --database-url mysql://root@localhost/app -o app.sql
  dbdumper --engine pgsql --database app --username backup --compress gzip -o app.sql.gz
  dbdumper --print-command --database-url sqlite:///var/data/app.db -o app.sql
")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Database connection URL
    #[arg(
        long,
        env = "DATABASE_URL",
        hide_env_values = true,
        help = "Database connection string (credentials will be sanitized in logs)"
    )]
    pub database_url: Option<String>,

    /// Database engine
    #[arg(
        long,
        value_name = "ENGINE",
        help = "Database engine: mysql, mariadb, pgsql, mongodb or sqlite (taken from the URL scheme when omitted)"
    )]
    pub engine: Option<DatabaseType>,

    #[arg(long, help = "Database host")]
    pub host: Option<String>,

    #[arg(long, help = "Database port (defaults to the engine's port)")]
    pub port: Option<u16>,

    #[arg(long, help = "Unix socket path")]
    pub socket: Option<String>,

    #[arg(long, help = "Database user")]
    pub username: Option<String>,

    /// Database password
    #[arg(
        long,
        env = "DB_PASSWORD",
        hide_env_values = true,
        help = "Database password (prefer the DB_PASSWORD environment variable)"
    )]
    pub password: Option<String>,

    #[arg(long, help = "Database name, or the file path for SQLite")]
    pub database: Option<String>,

    /// Output file path
    #[arg(short, long, value_name = "FILE", help = "Dump file to write")]
    pub output: PathBuf,

    #[arg(long, value_name = "COMPRESSOR", help = "Compress with gzip, bzip2 or lzma")]
    pub compress: Option<Compressor>,

    #[arg(long, help = "Append to the dump file instead of overwriting it")]
    pub append: bool,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Comma-separated list of tables to dump"
    )]
    pub include_tables: Vec<String>,

    #[arg(
        long,
        value_delimiter = ',',
        help = "Comma-separated list of tables to skip"
    )]
    pub exclude_tables: Vec<String>,

    #[arg(
        long = "extra-option",
        value_name = "OPTION",
        allow_hyphen_values = true,
        help = "Raw option passed to the dump binary (repeatable)"
    )]
    pub extra_options: Vec<String>,

    #[arg(
        long = "extra-option-after-db-name",
        value_name = "OPTION",
        allow_hyphen_values = true,
        help = "Raw option placed after the database name (repeatable)"
    )]
    pub extra_options_after_db_name: Vec<String>,

    #[arg(long, value_name = "DIR", help = "Directory containing the dump binary")]
    pub binary_path: Option<String>,

    #[arg(long, value_name = "SECS", help = "Kill the dump after this many seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Shell syntax to generate: posix or windows")]
    pub shell: Option<ShellFlavor>,

    #[arg(long, help = "Print the dump command instead of running it")]
    pub print_command: bool,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Increase verbosity
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase verbosity (-v, -vv, -vvv)"
    )]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true, help = "Suppress all output except errors")]
    pub quiet: bool,
}

/// Builds the dump configuration described by the parsed flags.
///
/// A database URL provides the base configuration and individual flags
/// override it. Without a URL, `--engine` is required.
///
/// # Errors
///
/// Returns an error if neither a URL nor an engine is given, if the URL is
/// invalid or names a different engine than `--engine`, or if the flags
/// conflict (for example `--compress` with `--append`).
pub fn build_config(cli: &Cli) -> anyhow::Result<DumpConfig> {
    let mut config = match (&cli.database_url, cli.engine) {
        (Some(url), Some(engine)) => DumpConfig::new(engine)
            .with_database_url(url)
            .with_context(|| format!("Failed to apply {}", redact_database_url(url)))?,
        (Some(url), None) => DumpConfig::from_database_url(url)
            .with_context(|| format!("Failed to parse {}", redact_database_url(url)))?,
        (None, Some(engine)) => DumpConfig::new(engine),
        (None, None) => bail!("Either --database-url or --engine is required"),
    };

    if let Some(host) = &cli.host {
        config = config.with_host(host);
    }
    if let Some(port) = cli.port {
        config = config.with_port(port);
    }
    if let Some(socket) = &cli.socket {
        config = config.with_socket(socket);
    }
    if let Some(username) = &cli.username {
        config = config.with_username(username);
    }
    if let Some(password) = &cli.password {
        config = config.with_password(password);
    }
    if let Some(database) = &cli.database {
        config = config.with_database(database);
    }
    if let Some(path) = &cli.binary_path {
        config = config.with_dump_binary_path(path);
    }
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }
    if let Some(shell) = cli.shell {
        config = config.with_shell(shell);
    }

    if !cli.include_tables.is_empty() {
        config = config.include_tables(cli.include_tables.as_slice())?;
    }
    if !cli.exclude_tables.is_empty() {
        config = config.exclude_tables(cli.exclude_tables.as_slice())?;
    }

    for option in &cli.extra_options {
        config = config.add_extra_option(option);
    }
    for option in &cli.extra_options_after_db_name {
        config = config.add_extra_option_after_db_name(option);
    }

    if let Some(compressor) = cli.compress {
        config = config.use_compressor(compressor)?;
    }
    if cli.append {
        config = config.use_append_mode()?;
    }

    Ok(config)
}
