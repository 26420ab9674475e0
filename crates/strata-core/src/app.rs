//! Synthesis context and assembly output
//!
//! [`App`] is the explicit context object for one synthesis run: it owns every
//! stack, the explicit dependency edges, and nothing else — there is no global
//! construct tree. `synth()` is pure; writing the artifact directory is a
//! separate step on [`Assembly`].

use crate::error::{Result, SynthError};
use crate::graph::StackGraph;
use crate::reference::HandleRegistry;
use crate::resource::SynthContext;
use crate::stack::Stack;
use serde::{Deserialize, Serialize};
use std::path::Path;

const MANIFEST_FILE: &str = "manifest.json";
const MANIFEST_VERSION: u32 = 1;

/// Owns the stacks of a single synthesis run
#[derive(Default)]
pub struct App {
    stacks: Vec<Stack>,
    edges: Vec<(String, String)>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stack; names must be unique
    pub fn add_stack(&mut self, stack: Stack) -> Result<()> {
        if self.stacks.iter().any(|s| s.name() == stack.name()) {
            return Err(SynthError::DuplicateStack(stack.name().to_string()));
        }
        self.stacks.push(stack);
        Ok(())
    }

    /// Declare that `consumer` must synthesize after `producer`
    pub fn add_dependency(&mut self, consumer: &str, producer: &str) -> Result<()> {
        for name in [consumer, producer] {
            if !self.stacks.iter().any(|s| s.name() == name) {
                return Err(SynthError::UnknownStack(name.to_string()));
            }
        }
        self.edges.push((consumer.to_string(), producer.to_string()));
        Ok(())
    }

    fn stack(&self, name: &str) -> &Stack {
        self.stacks
            .iter()
            .find(|s| s.name() == name)
            .expect("ordered names come from registered stacks")
    }

    /// Explicit edges merged with edges inferred from symbolic references
    ///
    /// Every cross-stack handle must map to an edge; a reference into a stack
    /// that was never registered is reported here, before any ordering or
    /// synthesis work.
    fn build_graph(&self) -> Result<StackGraph> {
        let mut graph = StackGraph::new();
        for stack in &self.stacks {
            graph.add_node(stack.name())?;
        }
        for (consumer, producer) in &self.edges {
            graph.add_dependency(consumer, producer)?;
        }
        for stack in &self.stacks {
            for reference in stack.references() {
                if reference.stack == stack.name() {
                    // Intra-stack data dependency; declaration order governs.
                    continue;
                }
                if !graph.contains(&reference.stack) {
                    return Err(SynthError::UnknownStack(reference.stack));
                }
                graph.add_dependency(stack.name(), &reference.stack)?;
            }
        }
        Ok(graph)
    }

    /// Resolved synthesis order without emitting artifacts
    pub fn topological_order(&self) -> Result<Vec<String>> {
        self.build_graph()?.topological_order()
    }

    /// Walk the ordered graph and emit one artifact per stack
    ///
    /// Deterministic: the same graph yields byte-identical artifacts. No
    /// external call and no filesystem write happens here.
    pub fn synth(&self) -> Result<Assembly> {
        let order = self.topological_order()?;
        let mut registry = HandleRegistry::new();
        let mut artifacts = Vec::with_capacity(order.len());

        for name in &order {
            let stack = self.stack(name);
            tracing::debug!("synthesizing stack '{name}' ({} resources)", stack.len());

            // Validate the whole stack before resolving anything in it.
            for (id, resource) in stack.resources() {
                resource.validate().map_err(|message| SynthError::Validation {
                    stack: name.clone(),
                    resource: id.to_string(),
                    message,
                })?;
            }

            let mut resources = Vec::with_capacity(stack.len());
            for (id, resource) in stack.resources() {
                let ctx = SynthContext::new(name, id, &registry);
                let properties = resource.properties(&ctx)?;
                for (attribute, value) in resource.exports(&ctx) {
                    registry.export(name, id, &attribute, value);
                }
                resources.push(ResourceArtifact {
                    id: id.to_string(),
                    kind: resource.kind().to_string(),
                    properties,
                });
            }

            artifacts.push(StackArtifact {
                stack: name.clone(),
                resources,
            });
        }

        Ok(Assembly { artifacts })
    }
}

/// Fully resolved declaration of a single resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceArtifact {
    pub id: String,
    pub kind: String,
    pub properties: serde_json::Value,
}

/// Declarative artifact for one stack
///
/// Resources appear in declaration order but the artifact carries no
/// intra-stack ordering guarantee for the convergence engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackArtifact {
    pub stack: String,
    pub resources: Vec<ResourceArtifact>,
}

impl StackArtifact {
    pub fn to_json(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    version: u32,
    stacks: Vec<String>,
}

/// Output of one synthesis run, in stack order
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    pub artifacts: Vec<StackArtifact>,
}

impl Assembly {
    pub fn get(&self, stack: &str) -> Option<&StackArtifact> {
        self.artifacts.iter().find(|a| a.stack == stack)
    }

    /// Write `<stack>.json` per stack plus a manifest into `dir`
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        for artifact in &self.artifacts {
            let path = dir.join(format!("{}.json", artifact.stack));
            std::fs::write(&path, artifact.to_json()?)?;
            tracing::debug!("wrote {}", path.display());
        }

        let manifest = Manifest {
            version: MANIFEST_VERSION,
            stacks: self.artifacts.iter().map(|a| a.stack.clone()).collect(),
        };
        let mut content = serde_json::to_string_pretty(&manifest)?;
        content.push('\n');
        std::fs::write(dir.join(MANIFEST_FILE), content)?;
        Ok(())
    }

    /// Read a previously written assembly back from `dir`
    pub fn load_from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let manifest_path = dir.join(MANIFEST_FILE);
        let manifest: Manifest =
            serde_json::from_str(&std::fs::read_to_string(&manifest_path)?)?;
        if manifest.version > MANIFEST_VERSION {
            return Err(SynthError::Assembly(format!(
                "manifest version {} is newer than supported version {}",
                manifest.version, MANIFEST_VERSION
            )));
        }

        let mut artifacts = Vec::with_capacity(manifest.stacks.len());
        for stack in &manifest.stacks {
            let path = dir.join(format!("{stack}.json"));
            let artifact: StackArtifact =
                serde_json::from_str(&std::fs::read_to_string(&path)?)?;
            artifacts.push(artifact);
        }
        Ok(Self { artifacts })
    }
}
