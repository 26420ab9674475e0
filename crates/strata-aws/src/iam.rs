//! IAM role declaration

use crate::naming::derived_id;
use strata_core::{Resource, Result, SynthContext};

/// Service role with managed policies
#[derive(Debug, Clone)]
pub struct Role {
    /// Service principal allowed to assume the role
    pub assumed_by: String,

    pub managed_policies: Vec<String>,
}

impl Role {
    /// Role assumable by a service principal, e.g. "ec2.amazonaws.com"
    pub fn service(principal: impl Into<String>) -> Self {
        Self {
            assumed_by: principal.into(),
            managed_policies: Vec::new(),
        }
    }

    pub fn add_managed_policy(&mut self, name: impl Into<String>) {
        self.managed_policies.push(name.into());
    }
}

impl Resource for Role {
    fn kind(&self) -> &'static str {
        "iam-role"
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.assumed_by.is_empty() {
            return Err("assumed_by principal must not be empty".to_string());
        }
        if self.managed_policies.iter().any(|p| p.is_empty()) {
            return Err("managed policy name must not be empty".to_string());
        }
        Ok(())
    }

    fn properties(&self, _ctx: &SynthContext<'_>) -> Result<serde_json::Value> {
        Ok(serde_json::json!({
            "assumed_by": self.assumed_by,
            "managed_policies": self.managed_policies,
        }))
    }

    fn exports(&self, ctx: &SynthContext<'_>) -> Vec<(String, serde_json::Value)> {
        vec![(
            "role_name".to_string(),
            serde_json::json!(derived_id("role", ctx)),
        )]
    }
}
