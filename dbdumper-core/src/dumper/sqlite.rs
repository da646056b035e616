//! `sqlite3 .dump` command strategy.
//!
//! The dump runs inside `BEGIN IMMEDIATE` so concurrent writers cannot
//! change the file mid-dump. The statements are echoed into the `sqlite3`
//! shell, whose echo syntax differs between POSIX and `cmd.exe`.

use async_trait::async_trait;

use super::{CommandContext, Contributor, EngineStrategy};
use crate::config::{DumpConfig, TableFilter};
use crate::shell::{self, ShellFlavor};

pub(crate) struct SqliteStrategy;

const CONTRIBUTORS: &[Contributor] = &[
    echo_statements,
    |ctx| vec![ctx.binary(), "--bail".to_string()],
    |ctx| ctx.config.extra_options.clone(),
    |ctx| vec![ctx.quote(&ctx.config.database)],
    |ctx| ctx.config.extra_options_after_db_name.clone(),
];

#[async_trait]
impl EngineStrategy for SqliteStrategy {
    fn contributors(&self) -> &'static [Contributor] {
        CONTRIBUTORS
    }

    async fn resolve_tables(&self, config: &DumpConfig) -> crate::Result<Vec<String>> {
        match &config.tables {
            TableFilter::All => Ok(Vec::new()),
            TableFilter::Include(tables) => Ok(tables.clone()),
            TableFilter::Exclude(excluded) => {
                let tables = list_tables(&config.database).await?;
                Ok(tables
                    .into_iter()
                    .filter(|table| !excluded.contains(table))
                    .collect())
            }
        }
    }
}

/// A table name as a `.dump` argument. The sqlite3 shell splits arguments
/// on whitespace unless they are double-quoted.
fn dot_command_arg(table: &str) -> String {
    if table.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        table.to_string()
    } else {
        shell::double_quote(table)
    }
}

/// Escapes characters `cmd.exe` interprets outside quotes.
fn caret_escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '^' | '&' | '|' | '<' | '>' | '(' | ')' | '%') {
            escaped.push('^');
        }
        escaped.push(ch);
    }
    escaped
}

fn echo_statements(ctx: &CommandContext<'_>) -> Vec<String> {
    let tables: String = ctx
        .tables
        .iter()
        .map(|table| format!(" {}", dot_command_arg(table)))
        .collect();

    let echo = match ctx.config.shell {
        ShellFlavor::Posix => format!(
            "echo '{}'",
            shell::escape_for_quote(ShellFlavor::Posix, &format!("BEGIN IMMEDIATE;\n.dump{}", tables))
        ),
        ShellFlavor::Windows => format!("(echo BEGIN IMMEDIATE; & echo .dump{})", caret_escape(&tables)),
    };

    vec![echo, "|".to_string()]
}

/// Lists the user tables of a SQLite file in creation order.
#[cfg(feature = "sqlite")]
async fn list_tables(path: &str) -> crate::Result<Vec<String>> {
    use sqlx::Connection;
    use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};

    use crate::error::DumpError;

    let options = SqliteConnectOptions::new()
        .filename(path)
        .read_only(true)
        .create_if_missing(false);

    let mut connection = SqliteConnection::connect_with(&options)
        .await
        .map_err(|e| DumpError::table_enumeration(format!("Failed to open SQLite database {}", path), e))?;

    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY rowid",
    )
    .fetch_all(&mut connection)
    .await
    .map_err(|e| DumpError::table_enumeration(format!("Failed to list tables of {}", path), e))?;

    connection
        .close()
        .await
        .map_err(|e| DumpError::table_enumeration(format!("Failed to close SQLite database {}", path), e))?;

    tracing::debug!("Found {} tables in {}", tables.len(), path);
    Ok(tables)
}

#[cfg(not(feature = "sqlite"))]
async fn list_tables(_path: &str) -> crate::Result<Vec<String>> {
    Err(crate::error::DumpError::unsupported_feature(
        "excluding tables (built without the `sqlite` feature)",
        "SQLite",
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dumper::DbDumper;

    fn command(config: DumpConfig, tables: &[&str]) -> String {
        let tables: Vec<String> = tables.iter().map(|t| (*t).to_string()).collect();
        DbDumper::new(config)
            .command_line("dump.sql", None, &tables)
            .unwrap()
    }

    #[test]
    fn test_posix_command() {
        let config = DumpConfig::sqlite()
            .with_shell(ShellFlavor::Posix)
            .with_database("dbname.sqlite");
        assert_eq!(
            command(config, &[]),
            "echo 'BEGIN IMMEDIATE;\n.dump' | 'sqlite3' --bail 'dbname.sqlite' > \"dump.sql\""
        );
    }

    #[test]
    fn test_posix_command_with_tables_and_binary_path() {
        let config = DumpConfig::sqlite()
            .with_shell(ShellFlavor::Posix)
            .with_dump_binary_path("/usr/bin")
            .with_database("/path/to/dbname.sqlite");
        assert_eq!(
            command(config, &["tb1", "tb4"]),
            "echo 'BEGIN IMMEDIATE;\n.dump tb1 tb4' | '/usr/bin/sqlite3' --bail '/path/to/dbname.sqlite' > \"dump.sql\""
        );
    }

    #[test]
    fn test_windows_command() {
        let config = DumpConfig::sqlite()
            .with_shell(ShellFlavor::Windows)
            .with_database("dbname.sqlite");
        assert_eq!(
            command(config, &["tb1"]),
            "(echo BEGIN IMMEDIATE; & echo .dump tb1) | \"sqlite3\" --bail \"dbname.sqlite\" > \"dump.sql\""
        );
    }

    #[test]
    fn test_extra_options_positions() {
        let config = DumpConfig::sqlite()
            .with_shell(ShellFlavor::Posix)
            .with_database("db.sqlite")
            .add_extra_option("-readonly")
            .add_extra_option_after_db_name("-cmd '.timeout 1000'");
        assert!(command(config, &[]).contains(
            "'sqlite3' --bail -readonly 'db.sqlite' -cmd '.timeout 1000' >"
        ));
    }

    #[test]
    fn test_odd_table_names() {
        assert_eq!(dot_command_arg("users"), "users");
        assert_eq!(dot_command_arg("my table"), "\"my table\"");
        assert_eq!(caret_escape(" a&b"), " a^&b");

        let config = DumpConfig::sqlite()
            .with_shell(ShellFlavor::Posix)
            .with_database("db.sqlite");
        assert!(command(config, &["it's"]).starts_with(r#"echo 'BEGIN IMMEDIATE;
.dump "it'\''s"' |"#));
    }

    #[tokio::test]
    async fn test_include_tables_resolve_without_io() {
        let config = DumpConfig::sqlite()
            .with_database("/nonexistent/db.sqlite")
            .include_tables("tb1, tb2")
            .unwrap();
        assert_eq!(SqliteStrategy.resolve_tables(&config).await.unwrap(), ["tb1", "tb2"]);
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_missing_file_fails_enumeration() {
        let config = DumpConfig::sqlite()
            .with_database("/nonexistent/db.sqlite")
            .exclude_tables("tb1")
            .unwrap();
        let error = SqliteStrategy.resolve_tables(&config).await.unwrap_err();
        assert!(matches!(error, crate::error::DumpError::TableEnumeration { .. }));
    }
}
