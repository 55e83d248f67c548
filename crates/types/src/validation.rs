//! Contract diagnostics produced when reconciling a binding table with a
//! delegate signature.
//!
//! These are values, not control flow: the validator collects every error it
//! finds and hands the list to the host's diagnostic channel.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::argument::{ArgumentDirection, ArgumentType};

/// A single contract violation between bound arguments and a delegate signature.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("{bound} argument(s) are bound but the delegate declares {declared} parameter(s)")]
    WrongArgumentCount { bound: usize, declared: usize },

    #[error("argument '{name}' is bound with direction {bound} but the delegate declares {expected}")]
    DirectionMismatch {
        name: String,
        bound: ArgumentDirection,
        expected: ArgumentDirection,
    },

    #[error("delegate input '{name}' expects type {expected} but the bound argument has type {bound}")]
    InTypeIncompatible {
        name: String,
        expected: ArgumentType,
        bound: ArgumentType,
    },

    #[error("delegate output '{name}' produces type {expected} which the bound argument of type {bound} cannot accept")]
    OutTypeIncompatible {
        name: String,
        expected: ArgumentType,
        bound: ArgumentType,
    },

    #[error("delegate parameter '{name}' has no bound argument")]
    MissingParameter { name: String },

    /// Only produced when the host opts into reporting unmatched bindings.
    #[error("bound argument '{name}' does not match any delegate parameter")]
    UnmatchedBinding { name: String },
}

impl ValidationError {
    pub fn direction_mismatch(name: impl Into<String>, bound: ArgumentDirection, expected: ArgumentDirection) -> Self {
        Self::DirectionMismatch {
            name: name.into(),
            bound,
            expected,
        }
    }

    pub fn in_type_incompatible(name: impl Into<String>, expected: ArgumentType, bound: ArgumentType) -> Self {
        Self::InTypeIncompatible {
            name: name.into(),
            expected,
            bound,
        }
    }

    pub fn out_type_incompatible(name: impl Into<String>, expected: ArgumentType, bound: ArgumentType) -> Self {
        Self::OutTypeIncompatible {
            name: name.into(),
            expected,
            bound,
        }
    }

    pub fn missing_parameter(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    pub fn unmatched_binding(name: impl Into<String>) -> Self {
        Self::UnmatchedBinding { name: name.into() }
    }

    /// Name of the argument the error refers to, when it refers to one.
    pub fn argument_name(&self) -> Option<&str> {
        match self {
            Self::WrongArgumentCount { .. } => None,
            Self::DirectionMismatch { name, .. }
            | Self::InTypeIncompatible { name, .. }
            | Self::OutTypeIncompatible { name, .. }
            | Self::MissingParameter { name }
            | Self::UnmatchedBinding { name } => Some(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_argument() {
        let error = ValidationError::direction_mismatch("x", ArgumentDirection::In, ArgumentDirection::Out);
        assert_eq!(error.to_string(), "argument 'x' is bound with direction In but the delegate declares Out");
        assert_eq!(error.argument_name(), Some("x"));

        let error = ValidationError::out_type_incompatible("total", ArgumentType::Number, ArgumentType::Integer);
        assert!(error.to_string().contains("type number"));
        assert!(error.to_string().contains("type integer"));
    }

    #[test]
    fn count_error_has_no_argument_name() {
        let error = ValidationError::WrongArgumentCount { bound: 1, declared: 2 };
        assert_eq!(error.argument_name(), None);
        assert!(error.to_string().starts_with("1 argument(s)"));
    }

    #[test]
    fn serializes_with_kind_tag() {
        let error = ValidationError::missing_parameter("y");
        let encoded = serde_json::to_value(&error).unwrap();
        assert_eq!(encoded, serde_json::json!({ "kind": "missing_parameter", "name": "y" }));
    }
}
