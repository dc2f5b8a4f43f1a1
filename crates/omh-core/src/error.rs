//! Error types for omh.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level result type for omh operations.
pub type Result<T> = std::result::Result<T, OmhError>;

/// Top-level error type for omh.
#[derive(Debug, Error)]
pub enum OmhError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },

    #[error("vault error: {0}")]
    Vault(String),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors raised while splitting and decoding a note's front matter.
#[derive(Debug, Error)]
pub enum FrontMatterError {
    /// No `---` delimited block with at least one line was found.
    ///
    /// Not fatal: callers keep the note with empty front matter.
    #[error("missing front matter")]
    Missing,

    #[error("malformed front matter: {0}")]
    Malformed(#[from] serde_yaml::Error),

    #[error("front matter must be a mapping, got {0}")]
    NotAMapping(&'static str),
}

impl FrontMatterError {
    /// Whether this is the recoverable "no front matter" condition.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_display_human_readable_messages() {
        let err = OmhError::Parse {
            path: PathBuf::from("notes/Broken.md"),
            source: FrontMatterError::NotAMapping("sequence"),
        };
        let msg = err.to_string();
        assert!(msg.contains("notes/Broken.md"));
        assert!(msg.contains("sequence"));

        let err = OmhError::Config("unknown time zone 'Mars/Olympus'".to_string());
        assert!(err.to_string().starts_with("configuration error"));
    }

    #[test]
    fn parse_error_keeps_front_matter_source() {
        use std::error::Error as _;

        let err = OmhError::Parse {
            path: PathBuf::from("Broken.md"),
            source: FrontMatterError::Missing,
        };
        let source = err.source().expect("source");
        assert_eq!(source.to_string(), "missing front matter");
    }

    #[test]
    fn missing_front_matter_is_recoverable() {
        assert!(FrontMatterError::Missing.is_missing());
        assert!(!FrontMatterError::NotAMapping("string").is_missing());
    }
}
