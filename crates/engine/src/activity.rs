//! The delegate-invoking activity: definition, metadata caching, and dispatch.
//!
//! An [`InvokeDelegate`] is defined once (delegate, bindings, default branch),
//! has its metadata cached through [`InvokeDelegate::cache_metadata`], and is
//! then executed any number of times. Each execution takes exactly one of two
//! paths:
//!
//! - **Default branch**: no delegate, or a delegate without a handler body.
//!   The configured default child (if any) is scheduled and the core is done.
//! - **Handler**: inputs are marshaled, the handler is scheduled together with
//!   a [`HandlerCompletion`], and the invocation waits for the scheduler to
//!   complete it.

use std::sync::Arc;

use invoke_types::{ActivityDelegate, ChildActivity};
use tracing::debug;

use crate::{
    binding::{BindingError, BindingTable, BoundArgument, ValueScope},
    error::InvokeError,
    host::{ActivityScheduler, MetadataSink, RuntimeArgument},
    marshal::{HandlerCompletion, collect_inputs},
    validator::{ContractReport, ContractValidator},
};

/// Where an invocation is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchTarget<'a> {
    /// A delegate with a handler body is bound.
    Handler(&'a ActivityDelegate),
    /// No handler is bound; run the default child when one is configured.
    Default(Option<&'a ChildActivity>),
}

/// State an invocation is left in once [`InvokeDelegate::execute`] returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationPhase {
    /// The default branch was taken. `scheduled` is false when no default
    /// child is configured, in which case nothing was scheduled at all.
    DefaultBranch { scheduled: bool },
    /// The handler was scheduled; outputs are written back when the scheduler
    /// completes the registered [`HandlerCompletion`].
    AwaitingCompletion,
}

/// Activity that invokes a caller-supplied delegate handler.
#[derive(Debug, Clone, Default)]
pub struct InvokeDelegate {
    delegate: Option<ActivityDelegate>,
    arguments: Arc<BindingTable>,
    default_branch: Option<ChildActivity>,
    validator: ContractValidator,
    contract: Option<Arc<ContractReport>>,
}

impl InvokeDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a configured validator (type hierarchy, unmatched-binding policy).
    pub fn with_validator(mut self, validator: ContractValidator) -> Self {
        self.validator = validator;
        self.contract = None;
        self
    }

    pub fn with_delegate(mut self, delegate: ActivityDelegate) -> Self {
        self.set_delegate(Some(delegate));
        self
    }

    pub fn with_default(mut self, child: ChildActivity) -> Self {
        self.default_branch = Some(child);
        self
    }

    /// Adds a bound argument; names must be unique.
    pub fn with_argument(mut self, name: impl Into<String>, argument: BoundArgument) -> Result<Self, BindingError> {
        self.bind_argument(name, argument)?;
        Ok(self)
    }

    /// Replaces the delegate. Any cached contract report is discarded.
    pub fn set_delegate(&mut self, delegate: Option<ActivityDelegate>) {
        self.delegate = delegate;
        self.contract = None;
    }

    /// Adds a bound argument. Any cached contract report is discarded.
    pub fn bind_argument(&mut self, name: impl Into<String>, argument: BoundArgument) -> Result<(), BindingError> {
        Arc::make_mut(&mut self.arguments).bind(name, argument)?;
        self.contract = None;
        Ok(())
    }

    pub fn delegate(&self) -> Option<&ActivityDelegate> {
        self.delegate.as_ref()
    }

    pub fn arguments(&self) -> &BindingTable {
        &self.arguments
    }

    pub fn default_branch(&self) -> Option<&ChildActivity> {
        self.default_branch.as_ref()
    }

    /// The contract report cached by the last [`cache_metadata`](Self::cache_metadata) call.
    pub fn contract(&self) -> Option<&ContractReport> {
        self.contract.as_deref()
    }

    /// Declares arguments, delegate, and default child to the host, validates
    /// the bindings against the delegate signature, reports every contract
    /// error to the sink, and caches the resulting report.
    pub fn cache_metadata(&mut self, sink: &mut dyn MetadataSink) -> &ContractReport {
        let mut parameters = Vec::with_capacity(self.arguments.len());
        for (name, argument) in self.arguments.iter() {
            let runtime_argument = RuntimeArgument {
                name: name.to_string(),
                argument_type: argument.declared_type().clone(),
                direction: argument.direction(),
            };
            sink.bind(&runtime_argument);
            parameters.push(runtime_argument);
        }
        sink.declare_parameters(parameters);
        sink.declare_delegate(self.delegate.as_ref());

        let report = self
            .validator
            .validate(&self.arguments, self.delegate.as_ref().map(|delegate| &delegate.signature));
        for error in &report.errors {
            sink.report_validation_error(error.clone());
        }

        sink.declare_child(self.default_branch.as_ref());

        self.contract.insert(Arc::new(report))
    }

    /// Decides which path an invocation takes.
    pub fn dispatch_target(&self) -> DispatchTarget<'_> {
        match &self.delegate {
            Some(delegate) if delegate.has_handler() => DispatchTarget::Handler(delegate),
            _ => DispatchTarget::Default(self.default_branch.as_ref()),
        }
    }

    /// Runs one invocation.
    ///
    /// Performs at most one schedule call. On the handler path the returned
    /// phase is [`InvocationPhase::AwaitingCompletion`] and the caller's
    /// bindings are written only when the scheduler completes the
    /// registered completion.
    pub fn execute(&self, scope: &dyn ValueScope, scheduler: &mut dyn ActivityScheduler) -> Result<InvocationPhase, InvokeError> {
        let contract = self.contract.as_ref().ok_or(InvokeError::NotValidated)?;
        if !contract.is_valid() {
            return Err(InvokeError::InvalidDefinition {
                error_count: contract.errors.len(),
            });
        }

        match self.dispatch_target() {
            DispatchTarget::Default(child) => {
                let Some(child) = child else {
                    debug!("no handler or default child configured; nothing to schedule");
                    return Ok(InvocationPhase::DefaultBranch { scheduled: false });
                };
                debug!(child = %child.id, "no handler bound; scheduling default branch");
                scheduler.schedule_child(child)?;
                Ok(InvocationPhase::DefaultBranch { scheduled: true })
            }
            DispatchTarget::Handler(delegate) => {
                let inputs = collect_inputs(&self.arguments, scope)?;
                let completion = HandlerCompletion::new(Arc::clone(&self.arguments), contract.has_output_arguments);
                debug!(
                    delegate = %delegate.name,
                    inputs = inputs.len(),
                    has_output_arguments = contract.has_output_arguments,
                    "scheduling delegate handler"
                );
                scheduler.schedule_handler(delegate, inputs, completion)?;
                Ok(InvocationPhase::AwaitingCompletion)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{binding::VariableScope, host::CollectedMetadata};
    use anyhow::Result;
    use invoke_types::{ArgumentDirection, ArgumentType, ArgumentValues, DelegateSignature, ValidationError};
    use serde_json::json;

    #[derive(Default)]
    struct RecordingScheduler {
        children: Vec<ChildActivity>,
        handlers: Vec<(String, ArgumentValues, HandlerCompletion)>,
    }

    impl ActivityScheduler for RecordingScheduler {
        fn schedule_child(&mut self, child: &ChildActivity) -> Result<()> {
            self.children.push(child.clone());
            Ok(())
        }

        fn schedule_handler(&mut self, delegate: &ActivityDelegate, inputs: ArgumentValues, completion: HandlerCompletion) -> Result<()> {
            self.handlers.push((delegate.name.clone(), inputs, completion));
            Ok(())
        }
    }

    fn example_signature() -> DelegateSignature {
        DelegateSignature::default()
            .with_parameter("x", ArgumentDirection::In, ArgumentType::Integer)
            .with_parameter("y", ArgumentDirection::Out, ArgumentType::String)
    }

    fn example_activity() -> InvokeDelegate {
        InvokeDelegate::new()
            .with_delegate(ActivityDelegate::new("format", example_signature()).with_handler("format-handler"))
            .with_argument("x", BoundArgument::literal(ArgumentType::Integer, json!(5)))
            .and_then(|activity| activity.with_argument("y", BoundArgument::variable(ArgumentDirection::Out, ArgumentType::String, "y")))
            .expect("unique bindings")
            .with_default(ChildActivity::new("fallback"))
    }

    #[test]
    fn cache_metadata_declares_arguments_in_binding_order() {
        let mut activity = example_activity();
        let mut metadata = CollectedMetadata::new();

        let report = activity.cache_metadata(&mut metadata).clone();

        assert!(report.is_valid());
        assert!(report.has_output_arguments);
        let names: Vec<&str> = metadata.parameters.iter().map(|argument| argument.name.as_str()).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(metadata.bound, metadata.parameters);
        assert_eq!(metadata.delegate.as_ref().map(|delegate| delegate.name.as_str()), Some("format"));
        assert_eq!(metadata.child, Some(ChildActivity::new("fallback")));
        assert!(!metadata.has_errors());
    }

    #[test]
    fn cache_metadata_reports_contract_errors() {
        let mut activity = InvokeDelegate::new()
            .with_delegate(
                ActivityDelegate::new("format", DelegateSignature::default().with_parameter("x", ArgumentDirection::Out, ArgumentType::Integer))
                    .with_handler("format-handler"),
            )
            .with_argument("x", BoundArgument::literal(ArgumentType::Integer, json!(5)))
            .expect("unique binding");
        let mut metadata = CollectedMetadata::new();

        activity.cache_metadata(&mut metadata);

        assert_eq!(
            metadata.errors,
            vec![ValidationError::direction_mismatch("x", ArgumentDirection::In, ArgumentDirection::Out)]
        );
    }

    #[test]
    fn execute_requires_cached_metadata() {
        let activity = example_activity();
        let mut scheduler = RecordingScheduler::default();

        let error = activity.execute(&VariableScope::new(), &mut scheduler).unwrap_err();
        assert!(matches!(error, InvokeError::NotValidated));
        assert!(scheduler.handlers.is_empty());
    }

    #[test]
    fn invalid_definition_is_never_scheduled() {
        let mut activity = InvokeDelegate::new()
            .with_delegate(ActivityDelegate::new("format", example_signature()).with_handler("format-handler"))
            .with_default(ChildActivity::new("fallback"));
        activity.cache_metadata(&mut CollectedMetadata::new());

        let mut scheduler = RecordingScheduler::default();
        let error = activity.execute(&VariableScope::new(), &mut scheduler).unwrap_err();

        assert!(matches!(error, InvokeError::InvalidDefinition { error_count: 3 }));
        assert!(scheduler.handlers.is_empty());
        assert!(scheduler.children.is_empty());
    }

    #[test]
    fn handler_path_marshals_inputs_and_registers_completion() {
        let mut activity = example_activity();
        activity.cache_metadata(&mut CollectedMetadata::new());
        let mut scheduler = RecordingScheduler::default();
        let mut scope = VariableScope::new();

        let phase = activity.execute(&scope, &mut scheduler).unwrap();

        assert_eq!(phase, InvocationPhase::AwaitingCompletion);
        assert!(scheduler.children.is_empty());
        let (delegate_name, inputs, completion) = scheduler.handlers.pop().expect("handler scheduled");
        assert_eq!(delegate_name, "format");
        assert_eq!(inputs.get("x"), Some(&json!(5)));
        assert_eq!(inputs.len(), 1);

        let mut outputs = ArgumentValues::new();
        outputs.insert("y".into(), json!("done"));
        assert_eq!(completion.complete(&mut scope, outputs).unwrap(), 1);
        assert_eq!(scope.get("y"), Some(&json!("done")));
    }

    #[test]
    fn no_delegate_schedules_only_the_default_branch() {
        let mut activity = InvokeDelegate::new().with_default(ChildActivity::new("fallback"));
        activity.cache_metadata(&mut CollectedMetadata::new());
        let mut scheduler = RecordingScheduler::default();

        let phase = activity.execute(&VariableScope::new(), &mut scheduler).unwrap();

        assert_eq!(phase, InvocationPhase::DefaultBranch { scheduled: true });
        assert_eq!(scheduler.children, vec![ChildActivity::new("fallback")]);
        assert!(scheduler.handlers.is_empty());
    }

    #[test]
    fn delegate_without_handler_takes_default_branch_after_validation() {
        let mut activity = InvokeDelegate::new()
            .with_delegate(ActivityDelegate::new("format", example_signature()))
            .with_argument("x", BoundArgument::literal(ArgumentType::Integer, json!(5)))
            .and_then(|activity| activity.with_argument("y", BoundArgument::variable(ArgumentDirection::Out, ArgumentType::String, "y")))
            .expect("unique bindings");
        let report = activity.cache_metadata(&mut CollectedMetadata::new()).clone();
        assert!(report.has_output_arguments);

        let mut scheduler = RecordingScheduler::default();
        let phase = activity.execute(&VariableScope::new(), &mut scheduler).unwrap();

        assert_eq!(phase, InvocationPhase::DefaultBranch { scheduled: false });
        assert!(scheduler.children.is_empty());
        assert!(scheduler.handlers.is_empty());
    }

    #[test]
    fn rebinding_discards_cached_contract() {
        let mut activity = example_activity();
        activity.cache_metadata(&mut CollectedMetadata::new());
        assert!(activity.contract().is_some());

        activity
            .bind_argument("z", BoundArgument::literal(ArgumentType::Any, json!(null)))
            .expect("unique binding");
        assert!(activity.contract().is_none());
    }

    #[test]
    fn clones_share_bindings_until_modified() {
        let activity = example_activity();
        let mut copy = activity.clone();
        copy.bind_argument("z", BoundArgument::literal(ArgumentType::Any, json!(null)))
            .expect("unique binding");

        assert_eq!(activity.arguments().len(), 2);
        assert_eq!(copy.arguments().len(), 3);
    }
}
