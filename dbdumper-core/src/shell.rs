//! Shell quoting, escaping and pipeline assembly.
//!
//! Every piece of a dump command line that is not a fixed flag goes through
//! this module. Nothing else in the crate wraps values in quotes or builds
//! pipes and redirects by hand.

use std::fmt;
use std::str::FromStr;

use crate::error::DumpError;

/// The shell convention of the environment that will run the command.
///
/// This is an explicit input rather than being inferred at every call site:
/// the dump may run in a container or remote shell whose convention differs
/// from the orchestrating host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellFlavor {
    /// POSIX `sh`: single quotes are literal-string delimiters.
    Posix,
    /// Windows `cmd.exe`: only double quotes delimit strings.
    Windows,
}

impl ShellFlavor {
    /// The flavor matching the platform this process runs on.
    pub const fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    /// Quote character used around binaries and dynamic values.
    pub const fn quote_char(self) -> char {
        match self {
            Self::Posix => '\'',
            Self::Windows => '"',
        }
    }
}

impl Default for ShellFlavor {
    fn default() -> Self {
        Self::host()
    }
}

impl fmt::Display for ShellFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posix => write!(f, "posix"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

impl FromStr for ShellFlavor {
    type Err = DumpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "posix" | "sh" | "unix" => Ok(Self::Posix),
            "windows" | "cmd" => Ok(Self::Windows),
            other => Err(DumpError::configuration(format!(
                "unknown shell flavor `{}`, expected `posix` or `windows`",
                other
            ))),
        }
    }
}

/// Backslash-escapes `\` and `"` so the value can sit inside double quotes.
pub fn escape_double_quoted(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '"') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Wraps `value` in double quotes after escaping it.
pub fn double_quote(value: &str) -> String {
    format!("\"{}\"", escape_double_quoted(value))
}

/// Escapes a value for the inside of a flavor-quoted string, without the
/// surrounding quotes.
///
/// POSIX single quotes cannot contain `'`, so it is closed, escaped and
/// reopened (`'\''`). `cmd.exe` doubles an embedded `"`.
pub fn escape_for_quote(flavor: ShellFlavor, value: &str) -> String {
    match flavor {
        ShellFlavor::Posix => value.replace('\'', r"'\''"),
        ShellFlavor::Windows => value.replace('"', "\"\""),
    }
}

/// Wraps `value` in the flavor's quote character.
pub fn quote(flavor: ShellFlavor, value: &str) -> String {
    let q = flavor.quote_char();
    format!("{q}{}{q}", escape_for_quote(flavor, value))
}

/// Characters that never need quoting in either shell.
fn is_plain(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | ',' | ':' | '@' | '+' | '=' | '/' | '-')
}

/// Quotes `value` only when it contains something a shell would interpret.
///
/// Plain identifiers are emitted bare, so `dbname` stays `dbname` while
/// `my table` becomes `'my table'` (or `"my table"` on Windows).
pub fn quote_if_needed(flavor: ShellFlavor, value: &str) -> String {
    if !value.is_empty() && value.chars().all(is_plain) {
        value.to_string()
    } else {
        quote(flavor, value)
    }
}

/// Builds the quoted path of a dump binary, honoring an install directory.
pub fn binary(flavor: ShellFlavor, install_dir: &str, name: &str) -> String {
    quote(flavor, &format!("{}{}", install_dir, name))
}

/// Where and how the final command writes its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect<'a> {
    /// `> "file"`
    Truncate,
    /// `>> "file"`
    Append,
    /// Pipe through a compressor program, then `> "file"`
    Compress(&'a str),
}

/// Appends the output redirect to `command`.
///
/// The target path is always double-quoted with `\` and `"` escaped, which
/// keeps spaces and parentheses verbatim.
pub fn redirect(flavor: ShellFlavor, command: &str, target: &str, mode: Redirect<'_>) -> String {
    let target = double_quote(target);
    match mode {
        Redirect::Truncate => format!("{} > {}", command, target),
        Redirect::Append => format!("{} >> {}", command, target),
        Redirect::Compress(compressor) => compress_pipeline(flavor, command, compressor, &target),
    }
}

/// Pipes `command` through `compressor` into an already-quoted `target`.
///
/// On POSIX the exit status of `command` is sent through file descriptor 3
/// and re-raised after the compressor finishes, so a failing dump is not
/// masked by a succeeding compressor. `cmd.exe` has no equivalent, so a
/// plain pipe is used there.
pub fn compress_pipeline(flavor: ShellFlavor, command: &str, compressor: &str, target: &str) -> String {
    match flavor {
        ShellFlavor::Windows => format!("{} | {} > {}", command, compressor, target),
        ShellFlavor::Posix => format!(
            "(((({}; echo $? >&3) | {} > {}) 3>&1) | (read x; exit $x))",
            command, compressor, target
        ),
    }
}
