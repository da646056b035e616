//! Compressor programs that dump output can be piped through.

use std::fmt;
use std::str::FromStr;

use crate::error::DumpError;

/// A shell filter program applied to the dump stream.
///
/// # Example
/// ```rust
/// use dbdumper_core::Compressor;
///
/// assert_eq!(Compressor::Gzip.command(), "gzip");
/// assert_eq!(Compressor::Lzma.extension(), ".lzma");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compressor {
    /// `gzip`, producing `.gz`
    Gzip,
    /// `bzip2`, producing `.bz2`
    Bzip2,
    /// `lzma -ze`, producing `.lzma`
    Lzma,
}

impl Compressor {
    /// Command line of the filter program.
    pub const fn command(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Lzma => "lzma -ze",
        }
    }

    /// File extension, including the leading dot.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Gzip => ".gz",
            Self::Bzip2 => ".bz2",
            Self::Lzma => ".lzma",
        }
    }
}

impl fmt::Display for Compressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gzip => write!(f, "gzip"),
            Self::Bzip2 => write!(f, "bzip2"),
            Self::Lzma => write!(f, "lzma"),
        }
    }
}

impl FromStr for Compressor {
    type Err = DumpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gzip" | "gz" => Ok(Self::Gzip),
            "bzip2" | "bz2" => Ok(Self::Bzip2),
            "lzma" => Ok(Self::Lzma),
            other => Err(DumpError::configuration(format!(
                "unknown compressor `{}`, expected one of gzip, bzip2, lzma",
                other
            ))),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_and_extensions() {
        let cases = [
            (Compressor::Gzip, "gzip", ".gz"),
            (Compressor::Bzip2, "bzip2", ".bz2"),
            (Compressor::Lzma, "lzma -ze", ".lzma"),
        ];
        for (compressor, command, extension) in cases {
            assert_eq!(compressor.command(), command);
            assert_eq!(compressor.extension(), extension);
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("GZIP".parse::<Compressor>().unwrap(), Compressor::Gzip);
        assert_eq!("bz2".parse::<Compressor>().unwrap(), Compressor::Bzip2);
        assert_eq!("lzma".parse::<Compressor>().unwrap(), Compressor::Lzma);

        let error = "zstd".parse::<Compressor>().unwrap_err();
        assert!(error.is_configuration_error());
    }
}
