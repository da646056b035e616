//! MongoDB command construction tests.

#![allow(clippy::unwrap_used)]

use dbdumper_core::{Compressor, DbDumper, DumpConfig, ShellFlavor};

async fn command(config: DumpConfig, dump_file: &str) -> String {
    DbDumper::new(config.with_shell(ShellFlavor::Posix))
        .dump_command(dump_file, "unused")
        .await
        .unwrap()
}

fn mongodb() -> DumpConfig {
    DumpConfig::mongodb().with_database("dbname")
}

#[tokio::test]
async fn test_default_command() {
    assert_eq!(
        command(mongodb(), "dbname.gz").await,
        r#"'mongodump' --db dbname --archive --host localhost --port 27017 > "dbname.gz""#
    );
}

#[tokio::test]
async fn test_username_and_password() {
    let cmd = command(mongodb().with_username("username").with_password("password"), "dbname.gz").await;
    assert_eq!(
        cmd,
        r#"'mongodump' --db dbname --archive --username 'username' --password 'password' --host localhost --port 27017 > "dbname.gz""#
    );
}

#[tokio::test]
async fn test_custom_host_and_port() {
    let cmd = command(mongodb().with_host("mongodb.test.com").with_port(27018), "dbname.gz").await;
    assert!(cmd.contains("--host mongodb.test.com --port 27018"));
}

#[tokio::test]
async fn test_collection_follows_host_and_port() {
    let cmd = command(mongodb().with_collection("mycollection"), "dbname.gz").await;
    assert_eq!(
        cmd,
        r#"'mongodump' --db dbname --archive --host localhost --port 27017 --collection mycollection > "dbname.gz""#
    );
}

#[tokio::test]
async fn test_authentication_database() {
    let cmd = command(
        mongodb()
            .with_username("username")
            .with_password("password")
            .with_authentication_database("admin"),
        "dbname.gz",
    )
    .await;
    assert!(cmd.ends_with(r#"--port 27017 --authenticationDatabase admin > "dbname.gz""#));
}

#[tokio::test]
async fn test_custom_binary_path() {
    let cmd = command(mongodb().with_dump_binary_path("/custom/directory"), "dbname.gz").await;
    assert!(cmd.starts_with("'/custom/directory/mongodump' --db dbname"));
}

#[tokio::test]
async fn test_gzip_compression() {
    let cmd = command(mongodb().use_compressor(Compressor::Gzip).unwrap(), "dbname.gz").await;
    assert_eq!(
        cmd,
        r#"(((('mongodump' --db dbname --archive --host localhost --port 27017; echo $? >&3) | gzip > "dbname.gz") 3>&1) | (read x; exit $x))"#
    );
}

#[tokio::test]
async fn test_password_with_quote_is_escaped() {
    let cmd = command(mongodb().with_username("u").with_password("it's"), "dbname.gz").await;
    assert!(cmd.contains(r"--password 'it'\''s'"));
}

#[tokio::test]
async fn test_include_tables_is_rejected() {
    let error = DbDumper::new(mongodb().include_tables("users").unwrap())
        .dump_command("dbname.gz", "unused")
        .await
        .unwrap_err();
    assert!(error.is_configuration_error());
}
