//! Configuration errors raised while building or applying directives.

use thiserror::Error;

/// Errors produced by the directive table and directive processing.
///
/// Engine and pass failures are not represented here; they are reported by
/// the engine itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    /// A `--pass-arg` value without the `:` delimiter.
    #[error("--pass-arg value must be in the form of KEY:VALUE")]
    MalformedPassArg,

    /// A level setter received something that is not a non-negative integer.
    #[error("invalid value `{value}` for --{directive}: expected a non-negative integer")]
    InvalidLevel { directive: String, value: String },

    /// Two directives (or a directive and a tool argument) share a name.
    #[error("directive `{0}` is registered more than once")]
    DuplicateDirective(String),

    #[error("unknown directive `{0}`")]
    UnknownDirective(String),

    #[error("directive `{0}` requires a value")]
    MissingValue(String),

    #[error("directive `{directive}` takes no value, got `{value}`")]
    UnexpectedValue { directive: String, value: String },
}
