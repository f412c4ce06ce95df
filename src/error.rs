//! Error types for the generator.
//!
//! Every variant is fatal: the template, example and provider files are a
//! build-time contract, so any violation aborts the run before a single
//! artifact is written. Missing *optional* data (no examples, no provider
//! method, no deprecation tag) never surfaces here.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Errors that abort a generation run.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Reading or writing a file failed.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The lexer met a character sequence it cannot tokenize.
    #[error("{}:{line}:{column}: unexpected input '{snippet}'", path.display())]
    Lex {
        /// The source file.
        path: PathBuf,
        /// 1-based line.
        line: usize,
        /// 1-based column.
        column: usize,
        /// The offending text.
        snippet: String,
    },

    /// The token stream does not have the expected structure.
    #[error("{}: {message}", path.display())]
    Parse {
        /// The source file.
        path: PathBuf,
        /// What went wrong.
        message: String,
    },

    /// A required class, trait or interface is missing from its file.
    #[error("class '{class}' not found in '{}'", path.display())]
    ClassNotFound {
        /// The class that was looked up.
        class: String,
        /// The file that was searched.
        path: PathBuf,
    },

    /// Two template functions share a name.
    #[error("template function '{0}' is declared more than once")]
    DuplicateFunction(String),

    /// A function name outside the loaded collection was requested.
    #[error("unknown template function '{0}'")]
    UnknownFunction(String),

    /// Inner parameter resolution needs a `return <expr>;` statement.
    #[error("template function '{0}' has no top-level return statement with a value")]
    MissingReturn(String),

    /// Template functions delegate to each other in a loop.
    #[error("cyclic delegation between template functions: {}", chain.join(" -> "))]
    CyclicDelegation {
        /// The functions on the cycle, in resolution order.
        chain: Vec<String>,
    },

    /// The configuration file could not be deserialized.
    #[error("invalid configuration '{}': {source}", path.display())]
    Config {
        /// The configuration file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_yaml::Error,
    },
}

impl GeneratorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}
