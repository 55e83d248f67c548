//! Build-time reconciliation of a binding table with a delegate signature.
//!
//! The signature is authoritative: every declared parameter must find a
//! binding with the same direction and a compatible type. Input parameters
//! must accept what the caller provides; output-bearing parameters must
//! produce something the caller's slot can hold. The pass never stops at the
//! first problem so hosts get a complete report in one go.

use invoke_types::{ArgumentDirection, DelegateSignature, ValidationError};
use tracing::debug;

use crate::{binding::BindingTable, compat::TypeHierarchy, settings::InvokeSettings};

/// Outcome of validating one activity definition.
///
/// Safe to cache for the lifetime of the definition and to share across
/// concurrent invocations, since it is derived from metadata only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContractReport {
    /// Every contract violation found, in discovery order.
    pub errors: Vec<ValidationError>,
    /// Whether any declared parameter hands a value back to the caller.
    pub has_output_arguments: bool,
}

impl ContractReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Compares caller bindings against a delegate signature.
#[derive(Debug, Clone, Default)]
pub struct ContractValidator {
    hierarchy: TypeHierarchy,
    report_unmatched_bindings: bool,
}

impl ContractValidator {
    pub fn new(hierarchy: TypeHierarchy) -> Self {
        Self {
            hierarchy,
            report_unmatched_bindings: false,
        }
    }

    pub fn from_settings(settings: &InvokeSettings) -> Self {
        Self {
            hierarchy: settings.type_hierarchy(),
            report_unmatched_bindings: settings.report_unmatched_bindings,
        }
    }

    /// Enables `UnmatchedBinding` diagnostics for bindings the signature does not declare.
    pub fn reporting_unmatched_bindings(mut self, enabled: bool) -> Self {
        self.report_unmatched_bindings = enabled;
        self
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    /// Validates `table` against `signature`.
    ///
    /// An absent signature means no delegate is configured; that is not an
    /// error and yields an empty report.
    pub fn validate(&self, table: &BindingTable, signature: Option<&DelegateSignature>) -> ContractReport {
        let Some(signature) = signature else {
            debug!(bound = table.len(), "no delegate configured; skipping contract validation");
            return ContractReport::default();
        };

        let mut report = ContractReport::default();

        if table.len() != signature.len() {
            report.errors.push(ValidationError::WrongArgumentCount {
                bound: table.len(),
                declared: signature.len(),
            });
        }

        for parameter in signature.parameters() {
            report.has_output_arguments |= parameter.direction.is_output_bearing();

            let Some(bound) = table.get(&parameter.name) else {
                report.errors.push(ValidationError::missing_parameter(&parameter.name));
                continue;
            };

            if bound.direction() != parameter.direction {
                report
                    .errors
                    .push(ValidationError::direction_mismatch(&parameter.name, bound.direction(), parameter.direction));
            }

            if parameter.direction == ArgumentDirection::In {
                if !self.hierarchy.is_assignable(bound.declared_type(), &parameter.declared_type) {
                    report.errors.push(ValidationError::in_type_incompatible(
                        &parameter.name,
                        parameter.declared_type.clone(),
                        bound.declared_type().clone(),
                    ));
                }
            } else if !self.hierarchy.is_assignable(&parameter.declared_type, bound.declared_type()) {
                report.errors.push(ValidationError::out_type_incompatible(
                    &parameter.name,
                    parameter.declared_type.clone(),
                    bound.declared_type().clone(),
                ));
            }
        }

        if self.report_unmatched_bindings {
            for (name, _) in table.iter() {
                if !signature.parameters().iter().any(|parameter| parameter.name == name) {
                    report.errors.push(ValidationError::unmatched_binding(name));
                }
            }
        }

        debug!(
            bound = table.len(),
            declared = signature.len(),
            errors = report.errors.len(),
            has_output_arguments = report.has_output_arguments,
            "validated delegate contract"
        );
        report
    }
}
