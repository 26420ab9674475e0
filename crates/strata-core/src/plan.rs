//! Pure diff between two synthesized assemblies
//!
//! The convergence engine that actually applies deltas is external; it is
//! assumed idempotent, retried at-least-once, and able to fail part-way
//! through a rollout. Because synthesis is pure, re-running synth + diff after
//! a partial failure is always safe. This module only computes the desired
//! delta, it never applies anything.

use crate::app::Assembly;
use serde::{Deserialize, Serialize};

/// A planned change for a single resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub action_type: ActionType,

    /// Stack owning the resource
    pub stack: String,

    /// Resource identifier within the stack
    pub resource_id: String,

    /// Resource kind tag
    pub kind: String,
}

/// Type of change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Create,
    Update,
    Delete,
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Ordered set of planned changes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub actions: Vec<Action>,
    pub has_changes: bool,
}

impl Plan {
    /// Diff a fresh assembly against a previously recorded one
    ///
    /// `previous = None` means nothing has been applied yet: everything is a
    /// create. Actions follow current stack order; deletes of resources that
    /// disappeared follow in the previous assembly's order.
    pub fn diff(previous: Option<&Assembly>, current: &Assembly) -> Self {
        let mut actions = Vec::new();

        for artifact in &current.artifacts {
            let old_stack = previous.and_then(|p| p.get(&artifact.stack));
            for resource in &artifact.resources {
                let action_type = match old_stack
                    .and_then(|s| s.resources.iter().find(|r| r.id == resource.id))
                {
                    None => ActionType::Create,
                    Some(old) if old.properties != resource.properties
                        || old.kind != resource.kind =>
                    {
                        ActionType::Update
                    }
                    Some(_) => ActionType::NoOp,
                };
                actions.push(Action {
                    action_type,
                    stack: artifact.stack.clone(),
                    resource_id: resource.id.clone(),
                    kind: resource.kind.clone(),
                });
            }
        }

        if let Some(previous) = previous {
            for artifact in &previous.artifacts {
                let new_stack = current.get(&artifact.stack);
                for resource in &artifact.resources {
                    let gone = new_stack
                        .map(|s| !s.resources.iter().any(|r| r.id == resource.id))
                        .unwrap_or(true);
                    if gone {
                        actions.push(Action {
                            action_type: ActionType::Delete,
                            stack: artifact.stack.clone(),
                            resource_id: resource.id.clone(),
                            kind: resource.kind.clone(),
                        });
                    }
                }
            }
        }

        let has_changes = actions.iter().any(|a| a.action_type != ActionType::NoOp);
        Self {
            actions,
            has_changes,
        }
    }

    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            create: self.actions_by_type(ActionType::Create).len(),
            update: self.actions_by_type(ActionType::Update).len(),
            delete: self.actions_by_type(ActionType::Delete).len(),
            no_change: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

/// Counts per action type
#[derive(Debug, Clone)]
pub struct PlanSummary {
    pub create: usize,
    pub update: usize,
    pub delete: usize,
    pub no_change: usize,
}

impl std::fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} to create, {} to update, {} to delete, {} unchanged",
            self.create, self.update, self.delete, self.no_change
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{ResourceArtifact, StackArtifact};

    fn assembly(resources: &[(&str, &str, serde_json::Value)]) -> Assembly {
        let mut artifacts: Vec<StackArtifact> = Vec::new();
        for (stack, id, properties) in resources {
            let resource = ResourceArtifact {
                id: id.to_string(),
                kind: "test".to_string(),
                properties: properties.clone(),
            };
            match artifacts.iter_mut().find(|a| a.stack == *stack) {
                Some(artifact) => artifact.resources.push(resource),
                None => artifacts.push(StackArtifact {
                    stack: stack.to_string(),
                    resources: vec![resource],
                }),
            }
        }
        Assembly { artifacts }
    }

    #[test]
    fn first_run_is_all_creates() {
        let current = assembly(&[
            ("network", "vpc", serde_json::json!({"cidr": "10.0.0.0/16"})),
            ("server", "web", serde_json::json!({"port": 80})),
        ]);
        let plan = Plan::diff(None, &current);
        assert!(plan.has_changes);
        assert_eq!(plan.actions_by_type(ActionType::Create).len(), 2);
        assert_eq!(plan.actions_by_type(ActionType::NoOp).len(), 0);
    }

    #[test]
    fn unchanged_assembly_is_all_noop() {
        let current = assembly(&[("network", "vpc", serde_json::json!({"a": 1}))]);
        let plan = Plan::diff(Some(&current), &current);
        assert!(!plan.has_changes);
        assert_eq!(plan.actions_by_type(ActionType::NoOp).len(), 1);
    }

    #[test]
    fn property_change_is_an_update() {
        let previous = assembly(&[("server", "web", serde_json::json!({"port": 80}))]);
        let current = assembly(&[("server", "web", serde_json::json!({"port": 8080}))]);
        let plan = Plan::diff(Some(&previous), &current);
        assert_eq!(plan.actions_by_type(ActionType::Update).len(), 1);
    }

    #[test]
    fn removed_resource_is_a_delete() {
        let previous = assembly(&[
            ("server", "web", serde_json::json!({})),
            ("server", "old", serde_json::json!({})),
        ]);
        let current = assembly(&[("server", "web", serde_json::json!({}))]);
        let plan = Plan::diff(Some(&previous), &current);
        let deletes = plan.actions_by_type(ActionType::Delete);
        assert_eq!(deletes.len(), 1);
        assert_eq!(deletes[0].resource_id, "old");
        assert_eq!(plan.summary().to_string(), "0 to create, 0 to update, 1 to delete, 1 unchanged");
    }
}
