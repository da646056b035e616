//! `mysqldump` and `mariadb-dump` command strategies.

use super::{CommandContext, Contributor, EngineStrategy, Filter, flag};
use crate::config::GTID_PURGED_AUTO;
use crate::shell;

/// MySQL (`mysqldump`).
pub(crate) struct MySqlStrategy;

/// MariaDB (`mariadb-dump`): MySQL flags plus the sandbox-mode filter.
pub(crate) struct MariaDbStrategy;

const CONTRIBUTORS: &[Contributor] = &[
    |ctx| vec![ctx.binary()],
    defaults_extra_file,
    |ctx| flag(!ctx.config.contents.creates_tables(), "--no-create-info"),
    |ctx| flag(!ctx.config.contents.includes_data(), "--no-data"),
    |ctx| flag(ctx.config.mysql.skip_comments, "--skip-comments"),
    |ctx| {
        if ctx.config.mysql.use_extended_inserts {
            vec!["--extended-insert".to_string()]
        } else {
            vec!["--skip-extended-insert".to_string()]
        }
    },
    |ctx| flag(ctx.config.mysql.use_single_transaction, "--single-transaction"),
    |ctx| flag(ctx.config.mysql.skip_lock_tables, "--skip-lock-tables"),
    |ctx| flag(ctx.config.mysql.disable_column_statistics, "--column-statistics=0"),
    |ctx| flag(ctx.config.mysql.use_quick, "--quick"),
    |ctx| flag(ctx.config.mysql.include_routines, "--routines"),
    socket,
    ignore_tables,
    ignore_tables_data,
    default_character_set,
    |ctx| ctx.config.extra_options.clone(),
    gtid_purged,
    database_name,
    include_tables,
    |ctx| ctx.config.extra_options_after_db_name.clone(),
];

const MYSQL_FILTERS: &[Filter] = &[strip_auto_increment];

const MARIADB_FILTERS: &[Filter] = &[strip_auto_increment, drop_sandbox_line];

impl EngineStrategy for MySqlStrategy {
    fn contributors(&self) -> &'static [Contributor] {
        CONTRIBUTORS
    }

    fn filters(&self) -> &'static [Filter] {
        MYSQL_FILTERS
    }
}

impl EngineStrategy for MariaDbStrategy {
    fn contributors(&self) -> &'static [Contributor] {
        CONTRIBUTORS
    }

    fn filters(&self) -> &'static [Filter] {
        MARIADB_FILTERS
    }
}

fn defaults_extra_file(ctx: &CommandContext<'_>) -> Vec<String> {
    ctx.credentials_file
        .map(|path| {
            format!(
                "--defaults-extra-file=\"{}\"",
                shell::escape_double_quoted(&path.to_string_lossy())
            )
        })
        .into_iter()
        .collect()
}

fn socket(ctx: &CommandContext<'_>) -> Vec<String> {
    if ctx.config.socket.is_empty() {
        return Vec::new();
    }
    vec![format!("--socket={}", ctx.quote_if_needed(&ctx.config.socket))]
}

fn ignore_tables(ctx: &CommandContext<'_>) -> Vec<String> {
    ctx.config
        .tables
        .excluded()
        .iter()
        .map(|table| {
            format!(
                "--ignore-table={}",
                ctx.quote_if_needed(&format!("{}.{}", ctx.config.database, table))
            )
        })
        .collect()
}

fn ignore_tables_data(ctx: &CommandContext<'_>) -> Vec<String> {
    ctx.config
        .mysql
        .exclude_tables_data
        .iter()
        .map(|table| {
            format!(
                "--ignore-table-data={}",
                ctx.quote_if_needed(&format!("{}.{}", ctx.config.database, table))
            )
        })
        .collect()
}

fn default_character_set(ctx: &CommandContext<'_>) -> Vec<String> {
    let charset = &ctx.config.mysql.default_character_set;
    if charset.is_empty() {
        return Vec::new();
    }
    vec![format!("--default-character-set={}", ctx.quote_if_needed(charset))]
}

fn gtid_purged(ctx: &CommandContext<'_>) -> Vec<String> {
    let value = &ctx.config.mysql.gtid_purged;
    if value.is_empty() || value == GTID_PURGED_AUTO {
        return Vec::new();
    }
    vec![format!("--set-gtid-purged={}", ctx.quote_if_needed(value))]
}

fn database_name(ctx: &CommandContext<'_>) -> Vec<String> {
    if ctx.config.database_from_extra_option || ctx.config.database.is_empty() {
        return Vec::new();
    }
    vec![ctx.quote_if_needed(&ctx.config.database)]
}

fn include_tables(ctx: &CommandContext<'_>) -> Vec<String> {
    if ctx.tables.is_empty() {
        return Vec::new();
    }
    let mut tokens = vec!["--tables".to_string()];
    tokens.extend(ctx.tables.iter().map(|table| ctx.quote_if_needed(table)));
    tokens
}

fn strip_auto_increment(ctx: &CommandContext<'_>) -> Option<String> {
    ctx.config
        .mysql
        .skip_auto_increment
        .then(|| r" | sed 's/ AUTO_INCREMENT=[0-9]*\b//'".to_string())
}

fn drop_sandbox_line(ctx: &CommandContext<'_>) -> Option<String> {
    (!ctx.config.mysql.sandbox_mode).then(|| "|tail +2".to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::config::DumpConfig;
    use crate::dumper::DbDumper;
    use crate::shell::ShellFlavor;
    use std::path::Path;

    fn command(config: DumpConfig) -> String {
        let dumper = DbDumper::new(config.with_shell(ShellFlavor::Posix));
        let tables = dumper.config().tables().included().to_vec();
        dumper
            .command_line("dump.sql", Some(Path::new("credentials.txt")), &tables)
            .unwrap()
    }

    fn mysql() -> DumpConfig {
        DumpConfig::mysql()
            .with_database("dbname")
            .with_username("username")
            .with_password("password")
    }

    #[test]
    fn test_every_optional_flag_in_order() {
        let config = mysql()
            .do_not_create_tables()
            .unwrap()
            .use_single_transaction()
            .skip_lock_tables()
            .disable_column_statistics()
            .use_quick()
            .include_routines()
            .with_socket("/var/run/mysqld.sock")
            .with_default_character_set("utf8mb4")
            .add_extra_option("--hex-blob")
            .with_gtid_purged("OFF")
            .include_tables("tb1, tb2")
            .unwrap()
            .add_extra_option_after_db_name("--where=1")
            .skip_auto_increment();

        assert_eq!(
            command(config),
            concat!(
                r#"'mysqldump' --defaults-extra-file="credentials.txt" --no-create-info"#,
                " --skip-comments --extended-insert --single-transaction --skip-lock-tables",
                " --column-statistics=0 --quick --routines --socket=/var/run/mysqld.sock",
                " --default-character-set=utf8mb4 --hex-blob --set-gtid-purged=OFF dbname",
                r" --tables tb1 tb2 --where=1 | sed 's/ AUTO_INCREMENT=[0-9]*\b//' > ",
                r#""dump.sql""#
            )
        );
    }

    #[test]
    fn test_table_data_exclusions_follow_table_exclusions() {
        let cmd = command(
            mysql()
                .exclude_tables(["tb3"])
                .unwrap()
                .exclude_tables_data("tb1, tb2")
                .with_default_character_set("utf8mb4"),
        );
        assert!(cmd.contains(
            "--ignore-table=dbname.tb3 --ignore-table-data=dbname.tb1 --ignore-table-data=dbname.tb2 --default-character-set=utf8mb4 dbname"
        ));
    }

    #[test]
    fn test_filters_come_before_the_compressor() {
        let cmd = command(
            DumpConfig::mariadb()
                .with_database("dbname")
                .with_username("username")
                .without_sandbox_mode()
                .use_compressor(crate::compression::Compressor::Gzip)
                .unwrap(),
        );
        assert!(cmd.starts_with("(((('mariadb-dump'"));
        assert!(cmd.contains(" dbname|tail +2; echo $? >&3) | gzip > "));
    }

    #[test]
    fn test_gtid_auto_emits_nothing() {
        let cmd = command(mysql().with_gtid_purged("AUTO"));
        assert!(!cmd.contains("--set-gtid-purged"));
    }

    #[test]
    fn test_unusual_names_are_quoted() {
        let cmd = command(
            mysql()
                .with_database("my db")
                .exclude_tables(["odd table"])
                .unwrap(),
        );
        assert!(cmd.contains("--ignore-table='my db.odd table'"));
        assert!(cmd.ends_with(r#" 'my db' > "dump.sql""#));
    }

    #[test]
    fn test_mariadb_sandbox_line() {
        let config = DumpConfig::mariadb()
            .with_database("dbname")
            .with_username("username")
            .with_password("password");

        assert_eq!(
            command(config.clone()),
            r#"'mariadb-dump' --defaults-extra-file="credentials.txt" --skip-comments --extended-insert dbname > "dump.sql""#
        );
        assert_eq!(
            command(config.without_sandbox_mode()),
            r#"'mariadb-dump' --defaults-extra-file="credentials.txt" --skip-comments --extended-insert dbname|tail +2 > "dump.sql""#
        );
    }

    #[test]
    fn test_mysql_ignores_sandbox_setting() {
        let cmd = command(mysql().without_sandbox_mode());
        assert!(!cmd.contains("tail"));
    }
}
