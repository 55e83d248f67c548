//! # Invoke Engine
//!
//! Contract validation and argument marshaling for activities that hand
//! control to a caller-supplied delegate handler.
//!
//! ## Key Features
//!
//! - **Contract Validation**: Reconciles the caller's named bindings with the
//!   handler's declared signature by name, direction, and type compatibility,
//!   collecting every violation before anything runs
//! - **Input Marshaling**: Reads input-bearing bindings into a fresh map per invocation
//! - **Dispatch**: Schedules the handler with a one-shot completion, or the
//!   default branch when no handler is bound
//! - **Output Marshaling**: Writes returned values back through output-bearing bindings
//!
//! ## Usage
//!
//! ```rust
//! use invoke_engine::{BoundArgument, CollectedMetadata, InlineScheduler, InvokeDelegate, VariableScope};
//! use invoke_types::{ActivityDelegate, ArgumentDirection, ArgumentType, ArgumentValues, DelegateSignature};
//! use serde_json::json;
//!
//! let signature = DelegateSignature::default()
//!     .with_parameter("x", ArgumentDirection::In, ArgumentType::Integer)
//!     .with_parameter("y", ArgumentDirection::Out, ArgumentType::String);
//!
//! let mut activity = InvokeDelegate::new()
//!     .with_delegate(ActivityDelegate::new("describe", signature).with_handler("describe"))
//!     .with_argument("x", BoundArgument::literal(ArgumentType::Integer, json!(5)))?
//!     .with_argument("y", BoundArgument::variable(ArgumentDirection::Out, ArgumentType::String, "label"))?;
//!
//! let mut metadata = CollectedMetadata::new();
//! assert!(activity.cache_metadata(&mut metadata).is_valid());
//!
//! let mut scheduler = InlineScheduler::new();
//! scheduler.register_handler("describe", |inputs: &ArgumentValues| {
//!     let mut outputs = ArgumentValues::new();
//!     outputs.insert("y".into(), json!(format!("x is {}", inputs["x"])));
//!     Ok(outputs)
//! });
//!
//! let mut scope = VariableScope::new();
//! activity.execute(&scope, &mut scheduler)?;
//! scheduler.run_pending(&mut scope)?;
//! assert_eq!(scope.get("label"), Some(&json!("x is 5")));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **`binding`**: Binding table, bound arguments, accessors, and value scopes
//! - **`compat`**: Type assignability rules and the named-type hierarchy
//! - **`validator`**: Contract validation and the cached report
//! - **`marshal`**: Input collection and the output-writing completion
//! - **`activity`**: The invoking activity and its dispatch state machine
//! - **`host`**: Scheduler and metadata-sink interfaces the host implements
//! - **`scheduler`**: In-process reference scheduler
//! - **`settings`**: File- and environment-driven validation settings

pub mod activity;
pub mod binding;
pub mod compat;
pub mod error;
pub mod host;
pub mod marshal;
pub mod scheduler;
pub mod settings;
pub mod validator;

// Re-export commonly used types for convenience
pub use activity::{DispatchTarget, InvocationPhase, InvokeDelegate};
pub use binding::{
    AccessError, ArgumentAccessor, BindingError, BindingTable, BoundArgument, LiteralValue, ValueScope, VariableReference, VariableScope,
};
pub use compat::TypeHierarchy;
pub use error::InvokeError;
pub use host::{ActivityScheduler, CollectedMetadata, MetadataSink, RuntimeArgument};
pub use marshal::{HandlerCompletion, apply_outputs, collect_inputs};
pub use scheduler::{HandlerFn, InlineScheduler};
pub use settings::{InvokeSettings, SETTINGS_PATH_ENV};
pub use validator::{ContractReport, ContractValidator};
