//! Running an assembled command line through the shell.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::error::DumpError;
use crate::shell::ShellFlavor;

/// A complete shell command line plus how to run it.
#[derive(Debug, Clone)]
pub struct ShellCommand {
    /// The command line, passed to the shell as a single string
    pub line: String,
    /// Extra environment variables merged into the child's environment
    pub env: Vec<(String, String)>,
    /// Kill the process if it runs longer than this
    pub timeout: Option<Duration>,
    /// Which shell interprets `line`
    pub shell: ShellFlavor,
}

impl ShellCommand {
    /// A command with no extra environment and no timeout.
    pub fn new(line: impl Into<String>, shell: ShellFlavor) -> Self {
        Self {
            line: line.into(),
            env: Vec::new(),
            timeout: None,
            shell,
        }
    }

    /// Builder method to add environment variables.
    pub fn with_env(mut self, env: impl IntoIterator<Item = (String, String)>) -> Self {
        self.env.extend(env);
        self
    }

    /// Builder method to set the timeout.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// What a finished (or killed) process left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when the process was killed
    pub exit_code: Option<i32>,
    /// Human-readable exit status
    pub exit_text: String,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl ProcessOutput {
    /// True for exit code 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Output for a process killed after running past `timeout`.
    pub fn timed_out(timeout: Duration) -> Self {
        Self {
            exit_code: None,
            exit_text: format!("timed out after {:?}", timeout),
            ..Self::default()
        }
    }
}

/// Conventional meaning of a shell exit code.
pub fn exit_code_text(code: i32) -> &'static str {
    match code {
        0 => "OK",
        1 => "General error",
        2 => "Misuse of shell builtins",
        126 => "Invoked command cannot execute",
        127 => "Command not found",
        128 => "Invalid exit argument",
        130 => "Interrupt",
        137 => "Kill",
        141 => "Broken pipe",
        143 => "Termination",
        _ => "Unknown error",
    }
}

fn status_text(status: std::process::ExitStatus) -> String {
    if let Some(code) = status.code() {
        return exit_code_text(code).to_string();
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return format!("Terminated by signal {}", signal);
        }
    }

    "Terminated".to_string()
}

/// Executes shell command lines. Implemented by [`ShellRunner`] in
/// production; tests substitute their own.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `command` to completion and captures its output.
    ///
    /// A non-zero exit is not an error at this level; the caller inspects
    /// [`ProcessOutput`].
    ///
    /// # Errors
    /// Returns `DumpError::Io` if the shell cannot be spawned.
    async fn run(&self, command: &ShellCommand) -> crate::Result<ProcessOutput>;
}

/// Runs commands with `sh -c` or `cmd /C` through `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl ShellRunner {
    fn command(command: &ShellCommand) -> Command {
        let mut process = match command.shell {
            ShellFlavor::Posix => {
                let mut process = Command::new("sh");
                process.arg("-c").arg(&command.line);
                process
            }
            ShellFlavor::Windows => {
                let mut process = Command::new("cmd");
                process.arg("/C");
                // cmd.exe does its own parsing; std's argument quoting would break it
                #[cfg(windows)]
                process.raw_arg(&command.line);
                #[cfg(not(windows))]
                process.arg(&command.line);
                process
            }
        };

        // pipeline stages inherit this group; a timeout kills the group
        #[cfg(unix)]
        process.process_group(0);

        process
            .envs(command.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        process
    }
}

async fn read_all<R: AsyncRead + Unpin>(reader: Option<R>) -> std::io::Result<String> {
    let mut buffer = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buffer).await?;
    }
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Kills the shell and every process it started.
///
/// The shell alone is not enough: the dump binary, filters and compressor
/// are its children and would keep running.
async fn terminate_tree(child: &mut Child) {
    if let Some(pid) = child.id() {
        #[cfg(unix)]
        let mut killer = {
            let mut killer = Command::new("kill");
            killer.args(["-KILL", "--", &format!("-{}", pid)]);
            killer
        };
        #[cfg(not(unix))]
        let mut killer = {
            let mut killer = Command::new("taskkill");
            killer.args(["/T", "/F", "/PID", &pid.to_string()]);
            killer
        };

        let status = killer
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await;
        match status {
            Ok(status) if status.success() => debug!("Killed process tree of {}", pid),
            Ok(status) => warn!("Killing process tree of {} exited with {}", pid, status),
            Err(e) => warn!("Failed to kill process tree of {}: {}", pid, e),
        }
    }

    if let Err(e) = child.start_kill() {
        debug!("Shell already gone: {}", e);
    }
    if let Err(e) = child.wait().await {
        warn!("Failed to reap timed out shell: {}", e);
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &ShellCommand) -> crate::Result<ProcessOutput> {
        let mut child = Self::command(command)
            .spawn()
            .map_err(|e| DumpError::io(format!("Failed to spawn {} shell", command.shell), e))?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let finished = async {
            let (status, stdout, stderr) =
                tokio::join!(child.wait(), read_all(stdout), read_all(stderr));
            Ok::<_, std::io::Error>((status?, stdout?, stderr?))
        };

        let result = match command.timeout {
            Some(limit) => {
                let outcome = tokio::time::timeout(limit, finished).await;
                if let Ok(result) = outcome {
                    result
                } else {
                    warn!("Dump process timed out after {:?}", limit);
                    terminate_tree(&mut child).await;
                    return Ok(ProcessOutput::timed_out(limit));
                }
            }
            None => finished.await,
        };
        let (status, stdout, stderr) =
            result.map_err(|e| DumpError::io("Failed to wait for dump process", e))?;

        debug!("Dump process exited with {}", status);

        Ok(ProcessOutput {
            exit_code: status.code(),
            exit_text: status_text(status),
            stdout,
            stderr,
        })
    }
}
