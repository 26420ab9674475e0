//! Stack: a named unit of resource declarations

use crate::error::{Result, SynthError};
use crate::reference::Ref;
use crate::resource::Resource;

/// Named unit of declared resources
///
/// Declarations keep their insertion order so artifacts are byte-stable, and
/// within a stack an earlier resource's exports are visible to later ones.
/// The artifact itself makes no intra-stack ordering promise: the external
/// engine may create independent resources in parallel.
pub struct Stack {
    name: String,
    resources: Vec<(String, Box<dyn Resource>)>,
}

impl Stack {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            resources: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a resource; ids must be unique within the stack
    pub fn add_resource(
        &mut self,
        id: impl Into<String>,
        resource: impl Resource + 'static,
    ) -> Result<()> {
        let id = id.into();
        if self.resources.iter().any(|(existing, _)| *existing == id) {
            return Err(SynthError::DuplicateResource {
                stack: self.name.clone(),
                resource: id,
            });
        }
        self.resources.push((id, Box::new(resource)));
        Ok(())
    }

    pub fn resources(&self) -> impl Iterator<Item = (&str, &dyn Resource)> {
        self.resources
            .iter()
            .map(|(id, r)| (id.as_str(), r.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// All symbolic handles consumed by this stack's declarations
    pub fn references(&self) -> Vec<Ref> {
        self.resources
            .iter()
            .flat_map(|(_, r)| r.references())
            .collect()
    }
}
