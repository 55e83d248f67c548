//! Host-tunable validation settings.
//!
//! Settings live in a small YAML or JSON document. Hosts either load it from
//! an explicit path or point the `INVOKE_DELEGATE_SETTINGS` environment
//! variable at it; without either, defaults apply.

use std::{env, fs, path::Path};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compat::TypeHierarchy;

/// Environment variable naming the settings file.
pub const SETTINGS_PATH_ENV: &str = "INVOKE_DELEGATE_SETTINGS";

/// Validation behaviour shared by every activity a host defines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvokeSettings {
    /// Report bound arguments that match no delegate parameter as
    /// `UnmatchedBinding` errors in addition to the aggregate count check.
    pub report_unmatched_bindings: bool,
    /// Named type → direct supertype, used for nominal assignability.
    pub type_hierarchy: IndexMap<String, String>,
}

impl InvokeSettings {
    /// Loads settings from a YAML or JSON file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        let settings: InvokeSettings =
            serde_yaml::from_str(&content).with_context(|| format!("Failed to parse settings file: {}", path.display()))?;
        debug!(
            path = %path.display(),
            report_unmatched_bindings = settings.report_unmatched_bindings,
            named_types = settings.type_hierarchy.len(),
            "loaded invoke settings"
        );
        Ok(settings)
    }

    /// Loads settings from the file named by [`SETTINGS_PATH_ENV`], or returns
    /// defaults when the variable is unset or blank.
    pub fn from_env() -> Result<Self> {
        match env::var(SETTINGS_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::load_from_path(path.trim()),
            _ => Ok(Self::default()),
        }
    }

    /// Builds the type hierarchy described by these settings.
    pub fn type_hierarchy(&self) -> TypeHierarchy {
        TypeHierarchy::new(self.type_hierarchy.clone())
    }
}
