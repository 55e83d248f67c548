//! Shared type definitions for delegate invocation.
//!
//! The models here describe both sides of a delegate call: the directional,
//! typed parameters a handler declares, and the diagnostics produced when a
//! caller's bindings do not line up with them. They carry no behaviour beyond
//! parsing and classification so hosts can persist or exchange them freely.

pub mod argument;
pub mod signature;
pub mod validation;

pub use argument::{ArgumentDirection, ArgumentType, ArgumentValues, ParseArgumentTypeError};
pub use signature::{ActivityDelegate, ChildActivity, DelegateSignature, SignatureParameter};
pub use validation::ValidationError;
