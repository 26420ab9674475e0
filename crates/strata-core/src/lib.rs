//! Strata synthesis core
//!
//! This crate implements the dependency-ordered, idempotent multi-stack
//! synthesis model: stacks form a DAG, synthesis walks a topological order of
//! that graph, and cross-stack references are symbolic handles resolved only
//! after the producing stack has synthesized.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   Strata CLI                     │
//! │              (strata synth/diff)                 │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                strata-core                       │
//! │  ┌──────────────┐  ┌──────────────────────────┐ │
//! │  │  StackGraph  │  │  HandleRegistry          │ │
//! │  │  (topo sort) │  │  (lazy ref resolution)   │ │
//! │  └──────┬───────┘  └──────────┬───────────────┘ │
//! │         └────────┬────────────┘                 │
//! │            App::synth() ──▶ Assembly            │
//! └─────────────────┬───────────────────────────────┘
//!                   │ artifact directory
//! ┌─────────────────▼───────────────────────────────┐
//! │        external convergence engine               │
//! │   (diff vs. recorded state, idempotent apply)    │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! Synthesis is pure: same graph in, byte-identical artifacts out, no external
//! call made. Applying the artifacts is the external engine's job.

pub mod app;
pub mod error;
pub mod graph;
pub mod plan;
pub mod reference;
pub mod resource;
pub mod stack;

// Re-exports
pub use app::{App, Assembly, ResourceArtifact, StackArtifact};
pub use error::{Result, SynthError};
pub use graph::StackGraph;
pub use plan::{Action, ActionType, Plan, PlanSummary};
pub use reference::{HandleRegistry, Input, Ref};
pub use resource::{Resource, SynthContext};
pub use stack::Stack;
