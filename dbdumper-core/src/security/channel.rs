//! Passing secrets to the dump process without putting them on its
//! argument list.
//!
//! MySQL and MariaDB read an INI option file named by
//! `--defaults-extra-file`; PostgreSQL reads a `PGPASSFILE` password file.
//! Both are written to uniquely named, owner-only temporary files that are
//! removed when the [`MaterializedCredentials`] guard drops.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;
use zeroize::Zeroizing;

use crate::config::DumpConfig;
use crate::error::DumpError;
use crate::models::DatabaseType;

/// How an engine receives its credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialsChannel {
    /// INI file passed with `--defaults-extra-file` (MySQL, MariaDB)
    OptionFile,
    /// libpq password file named by `PGPASSFILE` (PostgreSQL)
    PasswordFile,
    /// Nothing to materialize; MongoDB quotes credentials on the command
    /// line and SQLite has none
    None,
}

impl CredentialsChannel {
    /// The channel used by `engine`.
    pub const fn for_engine(engine: DatabaseType) -> Self {
        match engine {
            DatabaseType::MySQL | DatabaseType::MariaDB => Self::OptionFile,
            DatabaseType::PostgreSQL => Self::PasswordFile,
            DatabaseType::MongoDB | DatabaseType::SQLite => Self::None,
        }
    }

    /// Writes whatever this channel needs for one dump.
    ///
    /// # Errors
    /// Returns `DumpError::Io` if the temporary file cannot be created or
    /// written.
    pub fn materialize(self, config: &DumpConfig) -> crate::Result<MaterializedCredentials> {
        match self {
            Self::None => Ok(MaterializedCredentials::default()),
            Self::OptionFile => {
                let file = write_secret_file(".cnf", &mysql_option_file_contents(config))?;
                Ok(MaterializedCredentials {
                    file: Some(file),
                    env: Vec::new(),
                })
            }
            Self::PasswordFile => {
                let file = write_secret_file(".pgpass", &pgpass_contents(config))?;
                let env = vec![
                    (
                        "PGPASSFILE".to_string(),
                        file.path().to_string_lossy().into_owned(),
                    ),
                    ("PGDATABASE".to_string(), config.database.clone()),
                ];
                Ok(MaterializedCredentials {
                    file: Some(file),
                    env,
                })
            }
        }
    }
}

/// Credentials written for one dump. Dropping it deletes the file.
#[derive(Debug, Default)]
pub struct MaterializedCredentials {
    file: Option<NamedTempFile>,
    env: Vec<(String, String)>,
}

impl MaterializedCredentials {
    /// Path of the temporary credentials file, if one was written.
    pub fn path(&self) -> Option<&Path> {
        self.file.as_ref().map(NamedTempFile::path)
    }

    /// Environment variables the dump process needs.
    pub fn env(&self) -> &[(String, String)] {
        &self.env
    }
}

fn write_secret_file(suffix: &str, contents: &str) -> crate::Result<NamedTempFile> {
    // NamedTempFile creates the file with mode 0600 on unix
    let mut file = tempfile::Builder::new()
        .prefix("dbdumper-")
        .suffix(suffix)
        .tempfile()
        .map_err(|e| DumpError::io("Failed to create temporary credentials file", e))?;

    file.write_all(contents.as_bytes())
        .and_then(|()| file.flush())
        .map_err(|e| DumpError::io("Failed to write temporary credentials file", e))?;

    debug!("Wrote credentials file {}", file.path().display());
    Ok(file)
}

/// Backslash-escapes `\` and `'` for a single-quoted option-file value.
fn escape_option_value(value: &str) -> String {
    value.replace('\\', r"\\").replace('\'', r"\'")
}

/// Backslash-escapes `\` and `:` for a password-file field.
fn escape_pgpass_field(value: &str) -> String {
    value.replace('\\', r"\\").replace(':', r"\:")
}

/// Contents of the MySQL/MariaDB option file.
///
/// # Example
/// ```rust
/// use dbdumper_core::DumpConfig;
/// use dbdumper_core::security::mysql_option_file_contents;
///
/// let config = DumpConfig::mysql()
///     .with_username("root")
///     .with_password("secret")
///     .with_host("db");
///
/// assert_eq!(
///     mysql_option_file_contents(&config).as_str(),
///     "[client]\nuser = 'root'\npassword = 'secret'\nport = '3306'\nhost = 'db'"
/// );
/// ```
pub fn mysql_option_file_contents(config: &DumpConfig) -> Zeroizing<String> {
    let mut lines = vec![
        "[client]".to_string(),
        format!("user = '{}'", escape_option_value(config.credentials.username())),
        format!("password = '{}'", escape_option_value(config.credentials.password())),
        format!("port = '{}'", config.port().unwrap_or_default()),
    ];

    if config.socket.is_empty() {
        lines.push(format!("host = '{}'", escape_option_value(&config.host)));
    }

    if let Some(ssl_mode) = config.mysql.ssl_mode {
        lines.push(ssl_mode.as_option().to_string());
    }

    Zeroizing::new(lines.join("\n"))
}

/// Contents of the PostgreSQL password file: `host:port:db:user:password`.
pub fn pgpass_contents(config: &DumpConfig) -> Zeroizing<String> {
    let port = config.port().unwrap_or_default().to_string();
    let fields = [
        config.host.as_str(),
        port.as_str(),
        config.database.as_str(),
        config.credentials.username(),
        config.credentials.password(),
    ];

    Zeroizing::new(
        fields
            .iter()
            .map(|field| escape_pgpass_field(field))
            .collect::<Vec<_>>()
            .join(":"),
    )
}
