//! Managed relational database declarations
//!
//! `DbInstance.removal_policy` is a required field on purpose: the deployment
//! must state what happens to the database on stack deletion, and an unset
//! policy is a declaration error rather than a silent default.

use crate::naming::derived_id;
use strata_core::{Input, Ref, Resource, Result, SynthContext};

/// Subnet group placing the database inside specific subnets
#[derive(Debug, Clone)]
pub struct DbSubnetGroup {
    pub description: String,

    /// Subnet ids, usually a reference to the network stack's private subnets
    pub subnet_ids: Input,
}

impl Resource for DbSubnetGroup {
    fn kind(&self) -> &'static str {
        "db-subnet-group"
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.description.is_empty() {
            return Err("description must not be empty".to_string());
        }
        Ok(())
    }

    fn references(&self) -> Vec<Ref> {
        self.subnet_ids.as_handle().cloned().into_iter().collect()
    }

    fn properties(&self, ctx: &SynthContext<'_>) -> Result<serde_json::Value> {
        Ok(serde_json::json!({
            "description": self.description,
            "subnet_ids": ctx.resolve(&self.subnet_ids)?,
        }))
    }

    fn exports(&self, ctx: &SynthContext<'_>) -> Vec<(String, serde_json::Value)> {
        vec![(
            "name".to_string(),
            serde_json::json!(derived_id("dbsubnets", ctx)),
        )]
    }
}

/// Database engine selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbEngine {
    Mysql { version: String },
}

impl DbEngine {
    pub fn mysql(version: impl Into<String>) -> Self {
        DbEngine::Mysql {
            version: version.into(),
        }
    }
}

/// Database credentials; no secret material is held here, only the
/// instruction for the provider to generate one
#[derive(Debug, Clone)]
pub enum Credentials {
    GeneratedSecret { username: String },
}

impl Credentials {
    pub fn from_generated_secret(username: impl Into<String>) -> Self {
        Credentials::GeneratedSecret {
            username: username.into(),
        }
    }
}

/// What happens to the database when its stack is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPolicy {
    Retain,
    Snapshot,
    Destroy,
}

impl RemovalPolicy {
    fn as_str(&self) -> &'static str {
        match self {
            RemovalPolicy::Retain => "retain",
            RemovalPolicy::Snapshot => "snapshot",
            RemovalPolicy::Destroy => "destroy",
        }
    }
}

/// Managed database instance
#[derive(Debug, Clone)]
pub struct DbInstance {
    pub engine: DbEngine,

    /// e.g. "db.t3.micro"
    pub instance_class: String,

    pub allocated_storage_gb: u32,

    pub database_name: String,

    pub credentials: Credentials,

    pub security_groups: Vec<Input>,

    pub subnet_group: Input,

    pub multi_az: bool,

    pub publicly_accessible: bool,

    pub removal_policy: RemovalPolicy,
}

impl Resource for DbInstance {
    fn kind(&self) -> &'static str {
        "db-instance"
    }

    fn validate(&self) -> std::result::Result<(), String> {
        match self.instance_class.strip_prefix("db.") {
            Some(rest) if rest.contains('.') => {}
            _ => {
                return Err(format!(
                    "instance class '{}' is not of the form db.family.size",
                    self.instance_class
                ));
            }
        }
        if self.allocated_storage_gb < 20 {
            return Err(format!(
                "allocated storage {} GB is below the 20 GB engine minimum",
                self.allocated_storage_gb
            ));
        }
        let mut chars = self.database_name.chars();
        let first_is_alpha = chars.next().map(|c| c.is_ascii_alphabetic()).unwrap_or(false);
        if !first_is_alpha || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!(
                "database name '{}' must start with a letter and use [A-Za-z0-9_]",
                self.database_name
            ));
        }
        let DbEngine::Mysql { version } = &self.engine;
        if version.is_empty() {
            return Err("engine version must not be empty".to_string());
        }
        Ok(())
    }

    fn references(&self) -> Vec<Ref> {
        self.security_groups
            .iter()
            .chain(std::iter::once(&self.subnet_group))
            .filter_map(|input| input.as_handle().cloned())
            .collect()
    }

    fn properties(&self, ctx: &SynthContext<'_>) -> Result<serde_json::Value> {
        let DbEngine::Mysql { version } = &self.engine;
        let Credentials::GeneratedSecret { username } = &self.credentials;

        let mut security_group_ids = Vec::with_capacity(self.security_groups.len());
        for input in &self.security_groups {
            security_group_ids.push(ctx.resolve(input)?);
        }

        Ok(serde_json::json!({
            "engine": { "name": "mysql", "version": version },
            "instance_class": self.instance_class,
            "allocated_storage_gb": self.allocated_storage_gb,
            "database_name": self.database_name,
            "credentials": { "generated_secret_for": username },
            "security_group_ids": security_group_ids,
            "subnet_group": ctx.resolve(&self.subnet_group)?,
            "multi_az": self.multi_az,
            "publicly_accessible": self.publicly_accessible,
            "removal_policy": self.removal_policy.as_str(),
        }))
    }

    fn exports(&self, ctx: &SynthContext<'_>) -> Vec<(String, serde_json::Value)> {
        vec![
            (
                "db_instance_id".to_string(),
                serde_json::json!(derived_id("db", ctx)),
            ),
            (
                "endpoint".to_string(),
                serde_json::json!(format!("{}.rds.internal:3306", derived_id("db", ctx))),
            ),
        ]
    }
}
