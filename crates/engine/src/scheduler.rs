//! In-process reference scheduler.
//!
//! [`InlineScheduler`] is a minimal [`ActivityScheduler`] for hosts that embed
//! the core without a runtime of their own, and for tests and previews.
//! Scheduling only enqueues work; [`InlineScheduler::run_pending`] drains the
//! queue afterwards, so handler completion never overlaps the dispatch call
//! that scheduled it.

use std::{collections::VecDeque, fmt};

use anyhow::{Context, Result, anyhow};
use indexmap::IndexMap;
use invoke_types::{ActivityDelegate, ArgumentValues, ChildActivity};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{binding::ValueScope, host::ActivityScheduler, marshal::HandlerCompletion};

/// Handler body: receives the marshaled inputs and returns named outputs.
pub type HandlerFn = Box<dyn Fn(&ArgumentValues) -> Result<ArgumentValues> + Send + Sync>;

struct PendingHandler {
    delegate: ActivityDelegate,
    inputs: ArgumentValues,
    completion: HandlerCompletion,
}

/// Queue-backed scheduler that runs registered handler functions in-process.
#[derive(Default)]
pub struct InlineScheduler {
    handlers: IndexMap<String, HandlerFn>,
    pending: VecDeque<PendingHandler>,
    executed_children: Vec<ChildActivity>,
}

impl fmt::Debug for InlineScheduler {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("InlineScheduler")
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("pending", &self.pending.len())
            .field("executed_children", &self.executed_children)
            .finish()
    }
}

impl InlineScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler body under the identifier delegates refer to.
    pub fn register_handler<F>(&mut self, handler_id: impl Into<String>, handler: F)
    where
        F: Fn(&ArgumentValues) -> Result<ArgumentValues> + Send + Sync + 'static,
    {
        self.handlers.insert(handler_id.into(), Box::new(handler));
    }

    /// Default-branch children scheduled so far, in order.
    pub fn executed_children(&self) -> &[ChildActivity] {
        &self.executed_children
    }

    /// Number of handler runs waiting for [`run_pending`](Self::run_pending).
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Runs every queued handler and completes its registered completion.
    ///
    /// Returns the number of handlers completed. A failing handler stops the
    /// drain; its completion is dropped so caller state is left untouched.
    ///
    /// Output marshaling failures keep their [`InvokeError`](crate::InvokeError)
    /// as the root cause; use `error.downcast_ref::<InvokeError>()` to check
    /// [`is_contract_breach`](crate::InvokeError::is_contract_breach).
    pub fn run_pending(&mut self, scope: &mut dyn ValueScope) -> Result<usize> {
        let mut completed = 0;
        while let Some(PendingHandler {
            delegate,
            inputs,
            completion,
        }) = self.pending.pop_front()
        {
            let handler_id = delegate
                .handler
                .as_deref()
                .ok_or_else(|| anyhow!("delegate '{}' was scheduled without a handler", delegate.name))?;
            let handler = self
                .handlers
                .get(handler_id)
                .ok_or_else(|| anyhow!("no handler registered for '{handler_id}'"))?;

            debug!(delegate = %delegate.name, handler = %handler_id, inputs = inputs.len(), "running delegate handler");
            let returned = handler(&inputs).with_context(|| format!("handler '{handler_id}' failed"))?;
            let outputs = declared_outputs(&delegate, &inputs, returned);

            completion
                .complete(scope, outputs)
                .with_context(|| format!("failed to apply outputs of handler '{handler_id}'"))?;
            completed += 1;
        }
        Ok(completed)
    }
}

/// Shapes a handler's return map to exactly the output-bearing parameters of
/// its signature. Undeclared names are dropped. A missing bidirectional
/// parameter keeps the value it was passed in with; a missing `Out` parameter
/// becomes `null`.
fn declared_outputs(delegate: &ActivityDelegate, inputs: &ArgumentValues, mut returned: ArgumentValues) -> ArgumentValues {
    let outputs: ArgumentValues = delegate
        .signature
        .output_parameters()
        .map(|parameter| {
            let value = returned.shift_remove(&parameter.name).unwrap_or_else(|| {
                let passed_in = parameter.direction.is_input_bearing().then(|| inputs.get(&parameter.name)).flatten();
                passed_in.cloned().unwrap_or(Value::Null)
            });
            (parameter.name.clone(), value)
        })
        .collect();

    for name in returned.keys() {
        warn!(delegate = %delegate.name, output = %name, "dropping undeclared handler output");
    }
    outputs
}

impl ActivityScheduler for InlineScheduler {
    fn schedule_child(&mut self, child: &ChildActivity) -> Result<()> {
        debug!(child = %child.id, "executing default child");
        self.executed_children.push(child.clone());
        Ok(())
    }

    fn schedule_handler(&mut self, delegate: &ActivityDelegate, inputs: ArgumentValues, completion: HandlerCompletion) -> Result<()> {
        self.pending.push_back(PendingHandler {
            delegate: delegate.clone(),
            inputs,
            completion,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invoke_types::{ArgumentDirection, ArgumentType, DelegateSignature};
    use serde_json::json;

    fn delegate() -> ActivityDelegate {
        ActivityDelegate::new(
            "lookup",
            DelegateSignature::default()
                .with_parameter("key", ArgumentDirection::In, ArgumentType::String)
                .with_parameter("found", ArgumentDirection::Out, ArgumentType::Boolean)
                .with_parameter("value", ArgumentDirection::Out, ArgumentType::Any)
                .with_parameter("cache", ArgumentDirection::InOut, ArgumentType::Object),
        )
        .with_handler("lookup-handler")
    }

    #[test]
    fn declared_outputs_fill_missing_and_drop_extra() {
        let mut returned = ArgumentValues::new();
        returned.insert("found".into(), json!(true));
        returned.insert("debug".into(), json!("trace"));

        let outputs = declared_outputs(&delegate(), &ArgumentValues::new(), returned);

        let names: Vec<&str> = outputs.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["found", "value", "cache"]);
        assert_eq!(outputs["found"], json!(true));
        assert_eq!(outputs["value"], Value::Null);
        assert_eq!(outputs["cache"], Value::Null);
    }

    #[test]
    fn declared_outputs_keep_unreturned_in_out_values() {
        let mut inputs = ArgumentValues::new();
        inputs.insert("key".into(), json!("k"));
        inputs.insert("cache".into(), json!({ "hits": 2 }));
        let mut returned = ArgumentValues::new();
        returned.insert("found".into(), json!(false));

        let outputs = declared_outputs(&delegate(), &inputs, returned);

        assert_eq!(outputs["cache"], json!({ "hits": 2 }));
        assert_eq!(outputs["value"], Value::Null);
        assert!(!outputs.contains_key("key"));
    }

    #[test]
    fn schedule_child_records_execution() {
        let mut scheduler = InlineScheduler::new();
        scheduler.schedule_child(&ChildActivity::new("fallback")).unwrap();
        assert_eq!(scheduler.executed_children(), &[ChildActivity::new("fallback")]);
        assert_eq!(scheduler.pending_len(), 0);
    }
}
