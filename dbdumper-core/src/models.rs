//! Small closed enumerations shared by the configuration and the command
//! strategies.

use std::fmt;
use std::str::FromStr;

use crate::compression::Compressor;
use crate::error::DumpError;

/// Supported database engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatabaseType {
    MySQL,
    MariaDB,
    PostgreSQL,
    MongoDB,
    SQLite,
}

impl DatabaseType {
    /// Port used when none is configured. SQLite has none.
    pub const fn default_port(self) -> Option<u16> {
        match self {
            Self::MySQL | Self::MariaDB => Some(3306),
            Self::PostgreSQL => Some(5432),
            Self::MongoDB => Some(27017),
            Self::SQLite => None,
        }
    }

    /// Name of the external dump binary.
    pub const fn binary_name(self) -> &'static str {
        match self {
            Self::MySQL => "mysqldump",
            Self::MariaDB => "mariadb-dump",
            Self::PostgreSQL => "pg_dump",
            Self::MongoDB => "mongodump",
            Self::SQLite => "sqlite3",
        }
    }

    /// MySQL and MariaDB share flags, credentials file and extra-option
    /// scanning.
    pub const fn is_mysql_family(self) -> bool {
        matches!(self, Self::MySQL | Self::MariaDB)
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseType::MySQL => write!(f, "MySQL"),
            DatabaseType::MariaDB => write!(f, "MariaDB"),
            DatabaseType::PostgreSQL => write!(f, "PostgreSQL"),
            DatabaseType::MongoDB => write!(f, "MongoDB"),
            DatabaseType::SQLite => write!(f, "SQLite"),
        }
    }
}

impl FromStr for DatabaseType {
    type Err = DumpError;

    /// Selects an engine from a factory key or URL scheme.
    ///
    /// # Errors
    /// Returns `DumpError::UnknownEngine` for keys outside the supported set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mysql" => Ok(Self::MySQL),
            "mariadb" => Ok(Self::MariaDB),
            "pgsql" | "postgres" | "postgresql" => Ok(Self::PostgreSQL),
            "mongodb" | "mongo" => Ok(Self::MongoDB),
            "sqlite" | "sqlite3" => Ok(Self::SQLite),
            _ => Err(DumpError::UnknownEngine {
                name: s.to_string(),
            }),
        }
    }
}

/// How the dump stream reaches the destination file.
///
/// Compression and append mode are mutually exclusive, so they are variants
/// of one enum rather than two flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// `> file`
    #[default]
    Overwrite,
    /// `>> file`
    Append,
    /// `| compressor > file`
    Compressed(Compressor),
}

/// Which parts of the database end up in the dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DumpContents {
    /// Table definitions and rows
    #[default]
    SchemaAndData,
    /// Table definitions only
    SchemaOnly,
    /// Rows only
    DataOnly,
}

impl DumpContents {
    /// Whether `CREATE TABLE` statements are emitted.
    pub const fn creates_tables(self) -> bool {
        !matches!(self, Self::DataOnly)
    }

    /// Whether rows are emitted.
    pub const fn includes_data(self) -> bool {
        !matches!(self, Self::SchemaOnly)
    }
}

/// SSL line written into the MySQL/MariaDB credentials file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MySqlSslMode {
    /// `skip-ssl` (MariaDB, MySQL before 8.4)
    SkipSsl,
    /// `ssl-mode=DISABLED` (MySQL 8.0.26+)
    Disabled,
    /// `ssl-mode=PREFERRED`
    Preferred,
}

impl MySqlSslMode {
    /// The option-file line for this mode.
    pub const fn as_option(self) -> &'static str {
        match self {
            Self::SkipSsl => "skip-ssl",
            Self::Disabled => "ssl-mode=DISABLED",
            Self::Preferred => "ssl-mode=PREFERRED",
        }
    }
}

impl FromStr for MySqlSslMode {
    type Err = DumpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip-ssl" => Ok(Self::SkipSsl),
            "ssl-mode=DISABLED" => Ok(Self::Disabled),
            "ssl-mode=PREFERRED" => Ok(Self::Preferred),
            other => Err(DumpError::configuration(format!(
                "unsupported SSL flag `{}`, expected skip-ssl, ssl-mode=DISABLED or ssl-mode=PREFERRED",
                other
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_database_type_factory_keys() {
        let cases = [
            ("mysql", DatabaseType::MySQL),
            ("MySQL", DatabaseType::MySQL),
            ("mariadb", DatabaseType::MariaDB),
            ("pgsql", DatabaseType::PostgreSQL),
            ("postgres", DatabaseType::PostgreSQL),
            ("postgresql", DatabaseType::PostgreSQL),
            ("mongodb", DatabaseType::MongoDB),
            ("sqlite", DatabaseType::SQLite),
            ("sqlite3", DatabaseType::SQLite),
        ];
        for (key, expected) in cases {
            assert_eq!(key.parse::<DatabaseType>().unwrap(), expected, "key {}", key);
        }
    }

    #[test]
    fn test_unknown_engine() {
        let error = "oracle".parse::<DatabaseType>().unwrap_err();
        assert!(matches!(error, DumpError::UnknownEngine { ref name } if name == "oracle"));
        assert!(error.to_string().contains("`oracle`"));
    }

    #[test]
    fn test_default_ports() {
        assert_eq!(DatabaseType::MySQL.default_port(), Some(3306));
        assert_eq!(DatabaseType::MariaDB.default_port(), Some(3306));
        assert_eq!(DatabaseType::PostgreSQL.default_port(), Some(5432));
        assert_eq!(DatabaseType::MongoDB.default_port(), Some(27017));
        assert_eq!(DatabaseType::SQLite.default_port(), None);
    }

    #[test]
    fn test_dump_contents_flags() {
        assert!(DumpContents::SchemaAndData.creates_tables());
        assert!(DumpContents::SchemaAndData.includes_data());
        assert!(!DumpContents::DataOnly.creates_tables());
        assert!(!DumpContents::SchemaOnly.includes_data());
    }

    #[test]
    fn test_ssl_mode_parsing() {
        assert_eq!(
            "ssl-mode=DISABLED".parse::<MySqlSslMode>().unwrap(),
            MySqlSslMode::Disabled
        );
        assert!("ssl-mode=REQUIRED".parse::<MySqlSslMode>().is_err());
    }
}
