//! `pg_dump` command strategy. The password travels through `PGPASSFILE`.

use super::{CommandContext, Contributor, EngineStrategy, flag};
use crate::models::DumpContents;
use crate::shell;

pub(crate) struct PostgresStrategy;

const CONTRIBUTORS: &[Contributor] = &[
    |ctx| vec![ctx.binary()],
    |ctx| {
        vec![format!(
            "-U \"{}\"",
            shell::escape_double_quoted(ctx.config.credentials.username())
        )]
    },
    host,
    |ctx| {
        ctx.config
            .port()
            .map(|port| format!("-p {}", port))
            .into_iter()
            .collect()
    },
    |ctx| flag(ctx.config.postgres.use_inserts, "--inserts"),
    |ctx| flag(ctx.config.contents == DumpContents::DataOnly, "--data-only"),
    |ctx| flag(ctx.config.contents == DumpContents::SchemaOnly, "--schema-only"),
    |ctx| ctx.config.extra_options.clone(),
    table_filters,
    |ctx| ctx.config.extra_options_after_db_name.clone(),
];

impl EngineStrategy for PostgresStrategy {
    fn contributors(&self) -> &'static [Contributor] {
        CONTRIBUTORS
    }
}

/// `-h` takes the socket directory when one is set.
fn host(ctx: &CommandContext<'_>) -> Vec<String> {
    let host = if ctx.config.socket.is_empty() {
        &ctx.config.host
    } else {
        &ctx.config.socket
    };
    vec![format!("-h {}", ctx.quote_if_needed(host))]
}

fn table_filters(ctx: &CommandContext<'_>) -> Vec<String> {
    let included = ctx.tables.iter().map(|table| format!("-t {}", ctx.quote_if_needed(table)));
    let excluded = ctx
        .config
        .tables
        .excluded()
        .iter()
        .map(|table| format!("-T {}", ctx.quote_if_needed(table)));
    included.chain(excluded).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::config::DumpConfig;
    use crate::dumper::DbDumper;
    use crate::shell::ShellFlavor;

    fn command(config: DumpConfig) -> String {
        let dumper = DbDumper::new(config.with_shell(ShellFlavor::Posix));
        let tables = dumper.config().tables().included().to_vec();
        dumper.command_line("dump.sql", None, &tables).unwrap()
    }

    fn postgres() -> DumpConfig {
        DumpConfig::postgres()
            .with_database("dbname")
            .with_username("username")
            .with_password("password")
    }

    #[test]
    fn test_default_command() {
        assert_eq!(
            command(postgres()),
            r#"'pg_dump' -U "username" -h localhost -p 5432 > "dump.sql""#
        );
    }

    #[test]
    fn test_socket_replaces_host() {
        let cmd = command(postgres().with_socket("/var/run/postgresql"));
        assert!(cmd.contains("-h /var/run/postgresql -p 5432"));
    }

    #[test]
    fn test_contents_flags() {
        let cmd = command(postgres().do_not_create_tables().unwrap());
        assert!(cmd.contains(" --data-only"));
        assert!(!cmd.contains("--schema-only"));

        let cmd = command(postgres().do_not_dump_data().unwrap());
        assert!(cmd.contains(" --schema-only"));
    }

    #[test]
    fn test_after_db_name_options_follow_table_filters() {
        let cmd = command(
            postgres()
                .exclude_tables("tb1, tb2")
                .unwrap()
                .add_extra_option("--no-owner")
                .add_extra_option_after_db_name("--verbose"),
        );
        assert_eq!(
            cmd,
            r#"'pg_dump' -U "username" -h localhost -p 5432 --no-owner -T tb1 -T tb2 --verbose > "dump.sql""#
        );
    }

    #[test]
    fn test_username_is_escaped() {
        let cmd = command(postgres().with_username(r#"we"ird"#));
        assert!(cmd.contains(r#"-U "we\"ird""#));
    }
}
