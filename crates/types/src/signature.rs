//! Delegate signatures and the definition-time shapes that reference them.

use serde::{Deserialize, Serialize};

use crate::argument::{ArgumentDirection, ArgumentType};

/// A single named, directional parameter declared by a delegate handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureParameter {
    /// Parameter name, matched against binding table keys.
    pub name: String,
    /// Direction the handler expects the value to flow.
    pub direction: ArgumentDirection,
    /// Type the handler accepts (inputs) or produces (outputs).
    #[serde(rename = "type")]
    pub declared_type: ArgumentType,
}

impl SignatureParameter {
    pub fn new(name: impl Into<String>, direction: ArgumentDirection, declared_type: ArgumentType) -> Self {
        Self {
            name: name.into(),
            direction,
            declared_type,
        }
    }
}

/// Ordered parameter list exposed by a delegate handler.
///
/// The order drives validation and diagnostics order only; lookups are by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DelegateSignature {
    parameters: Vec<SignatureParameter>,
}

impl DelegateSignature {
    pub fn new(parameters: Vec<SignatureParameter>) -> Self {
        Self { parameters }
    }

    /// Appends a parameter, returning the signature for chaining.
    pub fn with_parameter(mut self, name: impl Into<String>, direction: ArgumentDirection, declared_type: ArgumentType) -> Self {
        self.parameters.push(SignatureParameter::new(name, direction, declared_type));
        self
    }

    pub fn parameters(&self) -> &[SignatureParameter] {
        &self.parameters
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Iterates the parameters the handler hands values back through.
    pub fn output_parameters(&self) -> impl Iterator<Item = &SignatureParameter> {
        self.parameters.iter().filter(|parameter| parameter.direction.is_output_bearing())
    }
}

/// A delegate slot on an invoking activity.
///
/// The signature is always present once a delegate is configured. The handler
/// identifier names the callable body the scheduler runs; a delegate without
/// one still gets its signature validated but executes the default branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityDelegate {
    /// Display name used in diagnostics and logs.
    pub name: String,
    /// Parameters declared by the handler.
    #[serde(default)]
    pub signature: DelegateSignature,
    /// Identifier of the handler body the scheduler resolves.
    #[serde(default)]
    pub handler: Option<String>,
}

impl ActivityDelegate {
    pub fn new(name: impl Into<String>, signature: DelegateSignature) -> Self {
        Self {
            name: name.into(),
            signature,
            handler: None,
        }
    }

    /// Attaches the handler body identifier.
    pub fn with_handler(mut self, handler: impl Into<String>) -> Self {
        self.handler = Some(handler.into());
        self
    }

    pub fn has_handler(&self) -> bool {
        self.handler.is_some()
    }
}

/// Opaque reference to the child unit scheduled when no handler is bound.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChildActivity {
    pub id: String,
}

impl ChildActivity {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_parameters_include_bidirectional_directions() {
        let signature = DelegateSignature::default()
            .with_parameter("request", ArgumentDirection::In, ArgumentType::Object)
            .with_parameter("status", ArgumentDirection::Out, ArgumentType::String)
            .with_parameter("cursor", ArgumentDirection::InOut, ArgumentType::Integer)
            .with_parameter("settings", ArgumentDirection::Property, ArgumentType::Object);

        let names: Vec<&str> = signature.output_parameters().map(|parameter| parameter.name.as_str()).collect();
        assert_eq!(names, vec!["status", "cursor", "settings"]);
        assert_eq!(signature.len(), 4);
    }

    #[test]
    fn deserializes_delegate_from_yaml() {
        let document = r#"
name: "notify"
handler: "notify-handler"
signature:
  - name: "recipient"
    direction: "in"
    type: "string"
  - name: "delivered"
    direction: "out"
    type: "boolean"
"#;
        let delegate: ActivityDelegate = serde_yaml::from_str(document).expect("parse delegate");

        assert_eq!(delegate.handler.as_deref(), Some("notify-handler"));
        assert_eq!(
            delegate.signature.parameters()[1],
            SignatureParameter::new("delivered", ArgumentDirection::Out, ArgumentType::Boolean)
        );
    }

    #[test]
    fn delegate_without_handler_defaults_to_none() {
        let delegate: ActivityDelegate = serde_json::from_str(r#"{"name": "placeholder"}"#).expect("parse delegate");
        assert!(!delegate.has_handler());
        assert!(delegate.signature.is_empty());
    }
}
