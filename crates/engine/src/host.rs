//! Collaborator interfaces the host workflow runtime provides.
//!
//! The core never queues, persists, or runs anything itself. At definition
//! time it describes its arguments and diagnostics to a [`MetadataSink`]; at
//! execution time it hands work to an [`ActivityScheduler`].

use anyhow::Result;
use invoke_types::{ActivityDelegate, ArgumentDirection, ArgumentType, ArgumentValues, ChildActivity, ValidationError};
use serde::{Deserialize, Serialize};

use crate::marshal::HandlerCompletion;

/// Build-time description of a bound argument, as declared to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeArgument {
    pub name: String,
    #[serde(rename = "type")]
    pub argument_type: ArgumentType,
    pub direction: ArgumentDirection,
}

/// Host build-time metadata and diagnostics channel.
pub trait MetadataSink {
    /// Registers one bound argument with the host's metadata system.
    fn bind(&mut self, argument: &RuntimeArgument);

    /// Declares the complete runtime argument list, in binding order.
    fn declare_parameters(&mut self, parameters: Vec<RuntimeArgument>);

    /// Records the configured delegate, if any.
    fn declare_delegate(&mut self, _delegate: Option<&ActivityDelegate>) {}

    /// Records the configured default child, if any.
    fn declare_child(&mut self, _child: Option<&ChildActivity>) {}

    /// Receives one contract violation.
    fn report_validation_error(&mut self, error: ValidationError);
}

/// Host scheduler contract used at execution time.
pub trait ActivityScheduler {
    /// Requests execution of a non-delegate child unit. Fire-and-forget.
    fn schedule_child(&mut self, child: &ChildActivity) -> Result<()>;

    /// Requests execution of the delegate's handler.
    ///
    /// Implementations must complete `completion` exactly once after the
    /// handler finishes successfully, passing one entry per output-bearing
    /// signature parameter.
    fn schedule_handler(&mut self, delegate: &ActivityDelegate, inputs: ArgumentValues, completion: HandlerCompletion) -> Result<()>;
}

/// A [`MetadataSink`] that records everything it receives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedMetadata {
    pub bound: Vec<RuntimeArgument>,
    pub parameters: Vec<RuntimeArgument>,
    pub delegate: Option<ActivityDelegate>,
    pub child: Option<ChildActivity>,
    pub errors: Vec<ValidationError>,
}

impl CollectedMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

impl MetadataSink for CollectedMetadata {
    fn bind(&mut self, argument: &RuntimeArgument) {
        self.bound.push(argument.clone());
    }

    fn declare_parameters(&mut self, parameters: Vec<RuntimeArgument>) {
        self.parameters = parameters;
    }

    fn declare_delegate(&mut self, delegate: Option<&ActivityDelegate>) {
        self.delegate = delegate.cloned();
    }

    fn declare_child(&mut self, child: Option<&ChildActivity>) {
        self.child = child.cloned();
    }

    fn report_validation_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }
}
