//! Resource declaration trait
//!
//! Resource kinds live in provider crates as typed records; this trait is the
//! seam the synthesizer works against. Validation runs before any artifact is
//! emitted, `properties` must return a fully resolved record, and `exports`
//! publishes the deterministic attributes downstream stacks may reference.

use crate::error::{Result, SynthError};
use crate::reference::{HandleRegistry, Input, Ref};

/// Per-resource view of a synthesis run
pub struct SynthContext<'a> {
    stack: &'a str,
    resource: &'a str,
    registry: &'a HandleRegistry,
}

impl<'a> SynthContext<'a> {
    pub(crate) fn new(stack: &'a str, resource: &'a str, registry: &'a HandleRegistry) -> Self {
        Self {
            stack,
            resource,
            registry,
        }
    }

    /// Name of the stack being synthesized
    pub fn stack(&self) -> &str {
        self.stack
    }

    /// Identifier of the resource being synthesized
    pub fn resource(&self) -> &str {
        self.resource
    }

    /// Resolve a handle to the producer's exported attribute
    pub fn resolve_ref(&self, r: &Ref) -> Result<serde_json::Value> {
        self.registry
            .resolve(r)
            .cloned()
            .ok_or_else(|| SynthError::Reference {
                stack: self.stack.to_string(),
                reference: r.to_string(),
            })
    }

    /// Resolve an input to a concrete value
    pub fn resolve(&self, input: &Input) -> Result<serde_json::Value> {
        match input {
            Input::Value(v) => Ok(v.clone()),
            Input::Ref(r) => self.resolve_ref(r),
        }
    }
}

/// A typed resource declaration
pub trait Resource {
    /// Kind tag written into the artifact (e.g. "vpc", "security-group")
    fn kind(&self) -> &'static str;

    /// Schema check. Messages are wrapped into [`SynthError::Validation`]
    /// with the owning stack and resource identifiers.
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }

    /// Symbolic handles this declaration consumes, used to infer stack edges
    fn references(&self) -> Vec<Ref> {
        Vec::new()
    }

    /// Fully resolved property record for the artifact
    fn properties(&self, ctx: &SynthContext<'_>) -> Result<serde_json::Value>;

    /// Deterministic attributes exported for downstream references
    fn exports(&self, _ctx: &SynthContext<'_>) -> Vec<(String, serde_json::Value)> {
        Vec::new()
    }
}
