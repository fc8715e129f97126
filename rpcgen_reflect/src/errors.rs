use thiserror::Error;

/// Result alias used across the reflection crate.
pub type ReflectResult<T> = Result<T, ReflectError>;

/// Errors raised while encoding a call. Decoding never fails; it stops and
/// reports how far it got.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReflectError {
    /// No entry point with this name in the table.
    #[error("entry point '{name}' not found")]
    UnknownEntryPoint { name: String },

    /// Wrong number of arguments for the entry point.
    #[error("'{entry}' takes {expected} argument(s) but {got} were given")]
    ArgumentCount {
        entry: String,
        expected: usize,
        got: usize,
    },

    /// A scalar argument of the wrong width.
    #[error("'{entry}': argument '{param}' must be {expected} byte(s), got {got}")]
    ScalarWidth {
        entry: String,
        param: String,
        expected: u32,
        got: usize,
    },

    /// A scalar given for a pointer parameter, or the other way round.
    #[error("'{entry}': argument '{param}' expects a {expected}")]
    ArgumentKind {
        entry: String,
        param: String,
        expected: &'static str,
    },

    /// A null pointer for a parameter without `nullAllowed`.
    #[error("'{entry}': argument '{param}' may not be null")]
    NullNotAllowed { entry: String, param: String },

    /// Buffer or packet larger than the 32-bit size fields can describe.
    #[error("'{entry}': packet does not fit a 32-bit size field")]
    PacketTooLarge { entry: String },
}
