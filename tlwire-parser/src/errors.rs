use std::num::ParseIntError;

use thiserror::Error;

/// Errors produced while parsing a single parameter token.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParamParseError {
    /// An empty name, type or namespace component.
    #[error("empty token")]
    Empty,
    /// A `{…}` block that isn't a `{X:Type}` generic declaration.
    #[error("malformed generic declaration")]
    MalformedGenericDef,
    /// A flag expression (`name.N?Type`) was malformed.
    #[error("invalid flag expression")]
    InvalidFlag,
    /// A flag bit outside the 32-bit flags word.
    #[error("flag bit {0} does not fit in a 32-bit flags word")]
    FlagOutOfRange(u32),
    /// A generic `<…>` argument was malformed (missing closing `>`).
    #[error("invalid generic argument (unclosed `<`)")]
    InvalidGeneric,
    /// `!X` used without a preceding `{X:Type}`.
    #[error("generic `{0}` used before being declared")]
    UndeclaredGeneric(String),
    /// `flags.N?T` referring to a flags word not declared before it.
    #[error("flags word `{0}` used before being declared")]
    UndeclaredFlags(String),
    /// A bare `name` with no `:type`, e.g. old-style `? = Int`.
    #[error("parameter without `:type` is not supported")]
    MissingType,
}

/// Errors produced while parsing a complete TL definition.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// The input was blank.
    #[error("empty definition")]
    Empty,
    /// No `= Type` was found.
    #[error("missing `= Type`")]
    MissingType,
    /// The name (before `=`) was missing or had empty namespace components.
    #[error("missing or malformed name")]
    MissingName,
    /// The `#id` hex literal was unparseable.
    #[error("invalid constructor id")]
    InvalidId(#[source] ParseIntError),
    /// A parameter was invalid.
    #[error("invalid parameter `{token}`")]
    InvalidParam {
        /// The raw parameter token.
        token: String,
        /// What was wrong with it.
        #[source]
        source: ParamParseError,
    },
}

/// A [`DefinitionError`] located in the schema source.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("line {line}: {source}")]
pub struct ParseError {
    /// 1-based line on which the failing definition ended.
    pub line: usize,
    /// The underlying failure.
    #[source]
    pub source: DefinitionError,
}
