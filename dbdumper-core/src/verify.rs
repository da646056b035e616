//! Checking that a finished dump produced a usable file.

use std::io::ErrorKind;
use std::path::Path;

use crate::error::DumpError;
use crate::process::ProcessOutput;

/// Checks the process result, then the dump file. Returns the file size.
///
/// # Errors
/// - `DumpError::ProcessFailed` for a non-zero or missing exit code
/// - `DumpError::DumpFileNotCreated` when the file does not exist
/// - `DumpError::DumpFileEmpty` when the file has zero length
/// - `DumpError::Io` when the file cannot be inspected
pub async fn verify_dump(output: &ProcessOutput, dump_file: &Path) -> crate::Result<u64> {
    if !output.success() {
        return Err(DumpError::ProcessFailed {
            exit_code: output.exit_code,
            exit_text: output.exit_text.clone(),
            stdout: output.stdout.clone(),
            stderr: output.stderr.clone(),
        });
    }

    let metadata = match tokio::fs::metadata(dump_file).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(DumpError::DumpFileNotCreated {
                path: dump_file.to_path_buf(),
            });
        }
        Err(e) => {
            return Err(DumpError::io(
                format!("Failed to inspect dump file {}", dump_file.display()),
                e,
            ));
        }
    };

    if metadata.len() == 0 {
        return Err(DumpError::DumpFileEmpty {
            path: dump_file.to_path_buf(),
        });
    }

    Ok(metadata.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn ok() -> ProcessOutput {
        ProcessOutput {
            exit_code: Some(0),
            exit_text: "OK".to_string(),
            ..ProcessOutput::default()
        }
    }

    #[tokio::test]
    async fn test_failed_process_keeps_diagnostics() {
        let output = ProcessOutput {
            exit_code: Some(2),
            exit_text: "Misuse of shell builtins".to_string(),
            stdout: String::new(),
            stderr: "mysqldump: Got error: 1045".to_string(),
        };
        let error = verify_dump(&output, Path::new("/nonexistent")).await.unwrap_err();

        assert!(matches!(error, DumpError::ProcessFailed { exit_code: Some(2), .. }));
        assert!(error.to_string().contains("1045"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dump.sql");
        let error = verify_dump(&ok(), &path).await.unwrap_err();
        assert!(matches!(error, DumpError::DumpFileNotCreated { .. }));
    }

    #[tokio::test]
    async fn test_empty_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dump.sql");
        std::fs::write(&path, "").unwrap();

        let error = verify_dump(&ok(), &path).await.unwrap_err();
        assert!(matches!(error, DumpError::DumpFileEmpty { .. }));
    }

    #[tokio::test]
    async fn test_non_empty_file_passes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dump.sql");
        std::fs::write(&path, "CREATE TABLE t (id INT);\n").unwrap();

        assert_eq!(verify_dump(&ok(), &path).await.unwrap(), 25);
    }
}
