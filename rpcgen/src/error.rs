use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the generator crate.
pub type GenResult<T> = Result<T, GenError>;

/// Fatal errors. Anything recoverable is a [`crate::diag::Diagnostic`] instead.
#[derive(Debug, Error)]
pub enum GenError {
    /// An input file (spec, overlay or types) could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An output directory or file could not be created.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A types file line could not be understood.
    #[error("{}:{line}: invalid type definition: {reason}", path.display())]
    TypeDefinition {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A command asked for an entry point the table does not contain.
    #[error("entry point '{0}' not found")]
    UnknownEntryPoint(String),
}
