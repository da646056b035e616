//! Credential protection.
//!
//! # Security Guarantees
//! - Credentials are stored in `Zeroizing` containers for automatic memory clearing
//! - MySQL and PostgreSQL passwords reach the dump binary through an
//!   owner-only temporary file, never through its argument list
//! - Temporary credential files are unlinked when their guard drops, on
//!   every exit path
//! - Database URLs are redacted before they appear in errors or logs
//!
//! # Module Structure
//! - `credentials`: Secure credential container with automatic memory zeroing
//! - `connection`: Database URL parsing and credential extraction
//! - `channel`: Temporary credential files and environment for the dump process

mod channel;
mod connection;
mod credentials;

pub use channel::{
    CredentialsChannel, MaterializedCredentials, mysql_option_file_contents, pgpass_contents,
};
pub use connection::{DatabaseUrl, parse_database_url};
pub use credentials::Credentials;
