//! Error types raised while executing a delegate invocation.
//!
//! Contract problems found at definition time are not errors in this sense;
//! they are [`ValidationError`](invoke_types::ValidationError) values collected
//! into a [`ContractReport`](crate::ContractReport). The variants here cover the
//! execution phase: refusing to run an invalid definition, accessor failures,
//! host failures, and the two internal-consistency breaches the output
//! marshaler can detect.

use invoke_types::ArgumentDirection;
use thiserror::Error;

use crate::binding::AccessError;

/// Failure raised while dispatching a delegate invocation or completing it.
#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("activity metadata has not been cached; validate the definition before executing it")]
    NotValidated,

    #[error("activity definition has {error_count} outstanding contract error(s) and cannot execute")]
    InvalidDefinition { error_count: usize },

    #[error("failed to read bound argument '{name}': {source}")]
    ReadArgument {
        name: String,
        #[source]
        source: AccessError,
    },

    #[error("failed to write bound argument '{name}': {source}")]
    WriteArgument {
        name: String,
        #[source]
        source: AccessError,
    },

    /// The scheduler returned a value for a name with no binding. Unreachable
    /// when the signature was validated against the binding table.
    #[error("internal contract breach: handler returned '{name}' which has no bound argument")]
    UnboundOutput { name: String },

    /// The scheduler returned a value for a binding that does not accept
    /// outputs. Unreachable when the signature was validated.
    #[error("internal contract breach: handler returned '{name}' but the bound argument has direction {direction}")]
    OutputDirectionMismatch { name: String, direction: ArgumentDirection },

    #[error(transparent)]
    Host(#[from] anyhow::Error),
}

impl InvokeError {
    /// Returns `true` for failures that indicate a broken scheduler/validator
    /// contract rather than a user-facing problem.
    pub fn is_contract_breach(&self) -> bool {
        matches!(self, Self::UnboundOutput { .. } | Self::OutputDirectionMismatch { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breach_classification_covers_only_output_marshaling_invariants() {
        assert!(InvokeError::UnboundOutput { name: "y".into() }.is_contract_breach());
        assert!(
            InvokeError::OutputDirectionMismatch {
                name: "x".into(),
                direction: ArgumentDirection::In,
            }
            .is_contract_breach()
        );
        assert!(!InvokeError::NotValidated.is_contract_breach());
        assert!(!InvokeError::InvalidDefinition { error_count: 2 }.is_contract_breach());
    }

    #[test]
    fn host_errors_are_transparent() {
        let error = InvokeError::from(anyhow::anyhow!("scheduler queue closed"));
        assert_eq!(error.to_string(), "scheduler queue closed");
    }
}
