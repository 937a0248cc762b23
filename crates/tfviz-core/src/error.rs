//! Error types shared by every pipeline stage

use thiserror::Error;

/// Failure of one pipeline stage. Every variant is terminal for the run.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed DOT input.
    #[error("parse error at line {line}, column {column}: {message}")]
    Parse {
        line: usize,
        column: usize,
        message: String,
    },

    /// A user supplied or configured pattern is not a valid regular expression.
    #[error("invalid pattern `{pattern}`")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Reading or writing one of the run's streams failed.
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration value or file.
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn parse(line: usize, column: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            column,
            message: message.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
