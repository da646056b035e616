//! `mongodump` command strategy. Writes an archive to stdout.

use super::{CommandContext, Contributor, EngineStrategy};
use crate::config::DumpConfig;
use crate::error::DumpError;

pub(crate) struct MongoStrategy;

const CONTRIBUTORS: &[Contributor] = &[
    |ctx| vec![ctx.binary()],
    |ctx| vec![format!("--db {}", ctx.quote_if_needed(&ctx.config.database))],
    |_| vec!["--archive".to_string()],
    credentials,
    |ctx| vec![format!("--host {}", ctx.quote_if_needed(&ctx.config.host))],
    |ctx| {
        ctx.config
            .port()
            .map(|port| format!("--port {}", port))
            .into_iter()
            .collect()
    },
    |ctx| {
        ctx.config
            .mongodb
            .collection
            .iter()
            .map(|collection| format!("--collection {}", ctx.quote_if_needed(collection)))
            .collect()
    },
    |ctx| {
        ctx.config
            .tables
            .excluded()
            .iter()
            .map(|collection| format!("--excludeCollection={}", ctx.quote_if_needed(collection)))
            .collect()
    },
    |ctx| {
        ctx.config
            .mongodb
            .authentication_database
            .iter()
            .map(|database| format!("--authenticationDatabase {}", ctx.quote_if_needed(database)))
            .collect()
    },
    |ctx| ctx.config.extra_options.clone(),
    |ctx| ctx.config.extra_options_after_db_name.clone(),
];

impl EngineStrategy for MongoStrategy {
    fn contributors(&self) -> &'static [Contributor] {
        CONTRIBUTORS
    }

    fn validate(&self, config: &DumpConfig) -> crate::Result<()> {
        if config.tables.included().is_empty() {
            Ok(())
        } else {
            Err(DumpError::configuration(
                "MongoDB dumps cannot include a table list; select one collection with `with_collection`",
            ))
        }
    }
}

/// mongodump has no credentials file; values are always quoted.
fn credentials(ctx: &CommandContext<'_>) -> Vec<String> {
    let credentials = &ctx.config.credentials;
    let mut tokens = Vec::new();
    if !credentials.username().is_empty() {
        tokens.push(format!("--username {}", ctx.quote(credentials.username())));
    }
    if credentials.has_password() {
        tokens.push(format!("--password {}", ctx.quote(credentials.password())));
    }
    tokens
}
