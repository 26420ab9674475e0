//! Cross-stack reference handles
//!
//! A resource property may point at an attribute of a resource in another
//! stack that has not been synthesized yet. The reference is held as a
//! symbolic [`Ref`] at declaration time and resolved against the
//! [`HandleRegistry`] only while the referencing stack synthesizes, after the
//! producing resource has exported its attributes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Symbolic handle to a resource attribute: `stack/resource#attribute`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ref {
    /// Stack that owns the referenced resource
    pub stack: String,

    /// Resource identifier within that stack
    pub resource: String,

    /// Exported attribute name
    pub attribute: String,
}

impl Ref {
    pub fn new(
        stack: impl Into<String>,
        resource: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            stack: stack.into(),
            resource: resource.into(),
            attribute: attribute.into(),
        }
    }
}

impl std::fmt::Display for Ref {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}#{}", self.stack, self.resource, self.attribute)
    }
}

/// Property value that is either concrete or a forward reference
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Value(serde_json::Value),
    Ref(Ref),
}

impl Input {
    pub fn value(value: impl Into<serde_json::Value>) -> Self {
        Input::Value(value.into())
    }

    pub fn reference(r: Ref) -> Self {
        Input::Ref(r)
    }

    /// The symbolic handle, if this input is unresolved
    pub fn as_handle(&self) -> Option<&Ref> {
        match self {
            Input::Value(_) => None,
            Input::Ref(r) => Some(r),
        }
    }
}

impl From<Ref> for Input {
    fn from(r: Ref) -> Self {
        Input::Ref(r)
    }
}

impl From<&str> for Input {
    fn from(value: &str) -> Self {
        Input::Value(serde_json::Value::String(value.to_string()))
    }
}

/// Registry of attributes exported by already-synthesized resources
///
/// BTreeMap keeps iteration deterministic; keys use the `Ref` display form.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    exports: BTreeMap<String, serde_json::Value>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an exported attribute for later resolution
    pub fn export(
        &mut self,
        stack: &str,
        resource: &str,
        attribute: &str,
        value: serde_json::Value,
    ) {
        let key = Ref::new(stack, resource, attribute).to_string();
        tracing::debug!("export {key}");
        self.exports.insert(key, value);
    }

    /// Look up a handle; `None` means the producer never exported it
    pub fn resolve(&self, r: &Ref) -> Option<&serde_json::Value> {
        self.exports.get(&r.to_string())
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_display_form() {
        let r = Ref::new("network", "MultiTierVPC", "vpc_id");
        assert_eq!(r.to_string(), "network/MultiTierVPC#vpc_id");
    }

    #[test]
    fn registry_export_and_resolve() {
        let mut registry = HandleRegistry::new();
        registry.export("network", "vpc", "vpc_id", serde_json::json!("vpc-1"));

        let hit = Ref::new("network", "vpc", "vpc_id");
        assert_eq!(registry.resolve(&hit), Some(&serde_json::json!("vpc-1")));

        let miss = Ref::new("network", "vpc", "nonexistent");
        assert_eq!(registry.resolve(&miss), None);
    }

    #[test]
    fn input_from_str_is_concrete() {
        let input = Input::from("subnet-123");
        assert!(input.as_handle().is_none());
    }
}
