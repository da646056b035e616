//! Database dump tool.
//!
//! Builds the native dump command for the configured engine and either
//! prints it or runs it and reports the size of the written dump file.
//!
//! # Security Guarantees
//! - MySQL and PostgreSQL passwords never appear on the command line
//! - Temporary credentials files are removed after every dump
//! - Database URLs are redacted before they are logged

use anyhow::Context;
use clap::Parser;
use dbdumper::{CREDENTIALS_PLACEHOLDER, Cli, build_config};
use dbdumper_core::{DbDumper, init_logging};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet)?;

    let config = build_config(&cli)?;
    debug!("Configuration: {:?}", config);
    let dumper = DbDumper::new(config);

    if cli.print_command {
        let command = dumper
            .dump_command(&cli.output, CREDENTIALS_PLACEHOLDER)
            .await
            .context("Failed to build the dump command")?;
        println!("{}", command);
        return Ok(());
    }

    let size = dumper
        .dump_to_file(&cli.output)
        .await
        .with_context(|| format!("Failed to dump into {}", cli.output.display()))?;

    info!("✓ Dump completed");
    if !cli.global.quiet {
        println!("Dump completed successfully");
        println!("Output: {}", cli.output.display());
        println!("Size: {} bytes", size);
    }

    Ok(())
}
