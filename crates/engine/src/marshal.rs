//! Moving argument values across the delegate boundary.
//!
//! Inputs are read out of the caller's bindings into a fresh map when the
//! handler is scheduled. Outputs come back through a [`HandlerCompletion`],
//! the one-shot continuation the scheduler completes after the handler
//! finishes; completing it writes each returned value through the matching
//! output-bearing binding.

use std::sync::Arc;

use invoke_types::ArgumentValues;
use tracing::{debug, error};

use crate::{
    binding::{BindingTable, ValueScope},
    error::InvokeError,
};

/// Reads the current value of every input-bearing binding, in table order.
pub fn collect_inputs(table: &BindingTable, scope: &dyn ValueScope) -> Result<ArgumentValues, InvokeError> {
    let mut inputs = ArgumentValues::with_capacity(table.len());
    for (name, argument) in table.iter() {
        if !argument.direction().is_input_bearing() {
            continue;
        }
        let value = argument.get(scope).map_err(|source| InvokeError::ReadArgument {
            name: name.to_string(),
            source,
        })?;
        inputs.insert(name.to_string(), value);
    }
    debug!(bound = table.len(), inputs = inputs.len(), "collected delegate inputs");
    Ok(inputs)
}

/// Writes returned output values back through their bindings.
///
/// Returns the number of values written. When the signature declares no
/// output-bearing parameters nothing is inspected at all. Every returned name
/// is checked against the table before the first write, so a contract breach
/// leaves the caller's scope untouched.
pub fn apply_outputs(
    table: &BindingTable,
    has_output_arguments: bool,
    outputs: ArgumentValues,
    scope: &mut dyn ValueScope,
) -> Result<usize, InvokeError> {
    if !has_output_arguments {
        return Ok(0);
    }

    let mut resolved = Vec::with_capacity(outputs.len());
    for (name, value) in outputs {
        let Some(argument) = table.get(&name) else {
            error!(argument = %name, "handler returned an output with no bound argument");
            return Err(InvokeError::UnboundOutput { name });
        };
        if !argument.direction().is_output_bearing() {
            error!(argument = %name, direction = %argument.direction(), "handler returned an output for a non-output binding");
            return Err(InvokeError::OutputDirectionMismatch {
                name,
                direction: argument.direction(),
            });
        }
        resolved.push((name, argument, value));
    }

    let written = resolved.len();
    for (name, argument, value) in resolved {
        argument
            .set(scope, value)
            .map_err(|source| InvokeError::WriteArgument { name, source })?;
    }
    debug!(written, "applied delegate outputs");
    Ok(written)
}

/// Completion continuation registered with the scheduler for one handler run.
///
/// Completing consumes the value, so the output marshaler runs at most once
/// per invocation. Dropping it without completing leaves caller state untouched.
#[derive(Debug)]
#[must_use = "the handler's outputs are only written back when the completion is completed"]
pub struct HandlerCompletion {
    arguments: Arc<BindingTable>,
    has_output_arguments: bool,
}

impl HandlerCompletion {
    pub(crate) fn new(arguments: Arc<BindingTable>, has_output_arguments: bool) -> Self {
        Self {
            arguments,
            has_output_arguments,
        }
    }

    /// Whether the completed handler is expected to return any values.
    pub fn expects_outputs(&self) -> bool {
        self.has_output_arguments
    }

    /// Runs the output marshaler with the values the handler returned.
    pub fn complete(self, scope: &mut dyn ValueScope, outputs: ArgumentValues) -> Result<usize, InvokeError> {
        apply_outputs(&self.arguments, self.has_output_arguments, outputs, scope)
    }
}
