//! Argument directions and declared argument types.
//!
//! Both the caller's binding table and the handler's signature describe their
//! parameters with these types, so the validator can compare them without
//! knowing where either list came from.

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Name → value map exchanged with the scheduler for a single invocation.
///
/// Order follows the binding table for inputs and the signature for outputs.
pub type ArgumentValues = IndexMap<String, Value>;

/// Direction in which a value flows across the delegate boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentDirection {
    /// The caller supplies the value.
    In,
    /// The handler supplies the value back to the caller.
    Out,
    /// The caller supplies a value and the handler hands one back.
    InOut,
    /// Bidirectional by convention, treated like `InOut`.
    Property,
}

impl ArgumentDirection {
    /// Returns `true` when the caller supplies a value for this direction.
    pub fn is_input_bearing(self) -> bool {
        matches!(self, Self::In | Self::InOut | Self::Property)
    }

    /// Returns `true` when the handler hands a value back for this direction.
    pub fn is_output_bearing(self) -> bool {
        matches!(self, Self::Out | Self::InOut | Self::Property)
    }
}

impl fmt::Display for ArgumentDirection {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::In => "In",
            Self::Out => "Out",
            Self::InOut => "InOut",
            Self::Property => "Property",
        };
        formatter.write_str(label)
    }
}

/// Declared type of a bound argument or signature parameter.
///
/// Types are written as text in definitions (`"integer"`, `"array<string>"`,
/// `"Customer"`) and serialize back to the same text. Any identifier that is
/// not a built-in keyword names a nominal type whose ancestry is supplied by
/// the host configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ArgumentType {
    /// Top type; every other type is assignable to it.
    Any,
    Boolean,
    /// Whole numbers. Assignable to `Number`.
    Integer,
    Number,
    String,
    /// Untyped JSON object.
    Object,
    /// Homogeneous array of the element type.
    Array(Box<ArgumentType>),
    /// Nominal type resolved against the configured type hierarchy.
    Named(String),
}

impl ArgumentType {
    /// Builds an array type with the given element type.
    pub fn array_of(element: ArgumentType) -> Self {
        Self::Array(Box::new(element))
    }

    /// Builds a nominal type.
    ///
    /// Fails for built-in keywords and anything that is not a type identifier,
    /// since those would not read back as the same nominal type.
    pub fn named(name: impl Into<String>) -> Result<Self, ParseArgumentTypeError> {
        let name = name.into();
        match name.parse::<ArgumentType>() {
            Ok(parsed @ Self::Named(_)) if parsed.to_string() == name => Ok(parsed),
            _ => Err(ParseArgumentTypeError::new(&name, "expected a type identifier that is not a built-in keyword")),
        }
    }
}

impl fmt::Display for ArgumentType {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => formatter.write_str("any"),
            Self::Boolean => formatter.write_str("boolean"),
            Self::Integer => formatter.write_str("integer"),
            Self::Number => formatter.write_str("number"),
            Self::String => formatter.write_str("string"),
            Self::Object => formatter.write_str("object"),
            Self::Array(element) => write!(formatter, "array<{element}>"),
            Self::Named(name) => formatter.write_str(name),
        }
    }
}

/// Error returned when a type expression cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid argument type '{input}': {reason}")]
pub struct ParseArgumentTypeError {
    pub input: String,
    pub reason: &'static str,
}

impl ParseArgumentTypeError {
    fn new(input: &str, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            reason,
        }
    }
}

impl FromStr for ArgumentType {
    type Err = ParseArgumentTypeError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ParseArgumentTypeError::new(input, "type expression is empty"));
        }

        if let Some(rest) = trimmed.strip_prefix("array<") {
            let Some(inner) = rest.strip_suffix('>') else {
                return Err(ParseArgumentTypeError::new(input, "array type is missing its closing '>'"));
            };
            let element = inner.parse::<ArgumentType>().map_err(|_| ParseArgumentTypeError::new(input, "array element type is invalid"))?;
            return Ok(Self::array_of(element));
        }

        let parsed = match trimmed {
            "any" => Self::Any,
            "boolean" | "bool" => Self::Boolean,
            "integer" | "int" => Self::Integer,
            "number" => Self::Number,
            "string" => Self::String,
            "object" => Self::Object,
            other if is_type_identifier(other) => Self::Named(other.to_string()),
            _ => return Err(ParseArgumentTypeError::new(input, "expected a built-in type or a type identifier")),
        };
        Ok(parsed)
    }
}

fn is_type_identifier(candidate: &str) -> bool {
    let mut characters = candidate.chars();
    let starts_well = characters.next().is_some_and(|first| first.is_alphabetic() || first == '_');
    starts_well && characters.all(|character| character.is_alphanumeric() || matches!(character, '_' | '.' | ':'))
}

impl TryFrom<String> for ArgumentType {
    type Error = ParseArgumentTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArgumentType> for String {
    fn from(value: ArgumentType) -> Self {
        value.to_string()
    }
}
