//! Assignability between declared argument types.

use std::collections::HashSet;

use indexmap::IndexMap;
use invoke_types::ArgumentType;

/// Nominal type ancestry plus the built-in assignability rules.
///
/// `parents` maps a named type to its direct supertype. Chains are walked
/// transitively; a cycle stops the walk instead of looping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeHierarchy {
    parents: IndexMap<String, String>,
}

impl TypeHierarchy {
    pub fn new(parents: IndexMap<String, String>) -> Self {
        Self { parents }
    }

    /// Declares `parent` as the direct supertype of `child`.
    pub fn with_parent(mut self, child: impl Into<String>, parent: impl Into<String>) -> Self {
        self.parents.insert(child.into(), parent.into());
        self
    }

    /// Returns `true` when a value of type `source` may be stored where `target` is expected.
    pub fn is_assignable(&self, source: &ArgumentType, target: &ArgumentType) -> bool {
        if source == target || *target == ArgumentType::Any {
            return true;
        }
        match (source, target) {
            (ArgumentType::Integer, ArgumentType::Number) => true,
            (ArgumentType::Array(source_element), ArgumentType::Array(target_element)) => {
                self.is_assignable(source_element, target_element)
            }
            (ArgumentType::Named(_), ArgumentType::Object) => true,
            (ArgumentType::Named(source_name), ArgumentType::Named(target_name)) => self.descends_from(source_name, target_name),
            _ => false,
        }
    }

    fn descends_from(&self, source_name: &str, target_name: &str) -> bool {
        let mut visited = HashSet::new();
        let mut current = source_name;
        while let Some(parent) = self.parents.get(current) {
            if parent == target_name {
                return true;
            }
            if !visited.insert(parent.as_str()) {
                return false;
            }
            current = parent;
        }
        false
    }
}
