//! Compute instance declaration
//!
//! The user-data payload is an opaque shell blob: the core never interprets
//! it, it only carries the rendered text into the artifact.

use crate::naming::derived_id;
use strata_core::{Input, Ref, Resource, Result, SynthContext};

/// Machine image selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineImage {
    AmazonLinux2,
    AmazonLinux2023,
}

impl MachineImage {
    fn as_str(&self) -> &'static str {
        match self {
            MachineImage::AmazonLinux2 => "amazon-linux-2",
            MachineImage::AmazonLinux2023 => "amazon-linux-2023",
        }
    }
}

/// Opaque bootstrap payload
#[derive(Debug, Clone, Default)]
pub struct UserData {
    lines: Vec<String>,
}

impl UserData {
    pub fn for_linux() -> Self {
        Self::default()
    }

    pub fn add_commands<I, S>(&mut self, commands: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(commands.into_iter().map(Into::into));
    }

    /// Rendered blob, shebang first
    pub fn render(&self) -> String {
        let mut script = String::from("#!/bin/bash\n");
        for line in &self.lines {
            script.push_str(line);
            script.push('\n');
        }
        script
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Compute instance declaration
#[derive(Debug, Clone)]
pub struct Instance {
    /// e.g. "t2.micro"
    pub instance_type: String,

    pub machine_image: MachineImage,

    /// Subnet to place the instance in
    pub subnet: Input,

    pub security_group: Input,

    pub role: Input,

    pub user_data: Option<UserData>,
}

impl Resource for Instance {
    fn kind(&self) -> &'static str {
        "instance"
    }

    fn validate(&self) -> std::result::Result<(), String> {
        match self.instance_type.split_once('.') {
            Some((family, size)) if !family.is_empty() && !size.is_empty() => Ok(()),
            _ => Err(format!(
                "instance type '{}' is not of the form family.size",
                self.instance_type
            )),
        }
    }

    fn references(&self) -> Vec<Ref> {
        [&self.subnet, &self.security_group, &self.role]
            .into_iter()
            .filter_map(|input| input.as_handle().cloned())
            .collect()
    }

    fn properties(&self, ctx: &SynthContext<'_>) -> Result<serde_json::Value> {
        let user_data = match &self.user_data {
            Some(data) if !data.is_empty() => serde_json::json!(data.render()),
            _ => serde_json::Value::Null,
        };
        Ok(serde_json::json!({
            "instance_type": self.instance_type,
            "machine_image": self.machine_image.as_str(),
            "subnet_id": ctx.resolve(&self.subnet)?,
            "security_group_ids": [ctx.resolve(&self.security_group)?],
            "role": ctx.resolve(&self.role)?,
            "user_data": user_data,
        }))
    }

    fn exports(&self, ctx: &SynthContext<'_>) -> Vec<(String, serde_json::Value)> {
        vec![(
            "instance_id".to_string(),
            serde_json::json!(derived_id("i", ctx)),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web_server() -> Instance {
        let mut user_data = UserData::for_linux();
        user_data.add_commands(["yum install -y httpd", "systemctl start httpd"]);
        Instance {
            instance_type: "t2.micro".to_string(),
            machine_image: MachineImage::AmazonLinux2,
            subnet: Ref::new("network", "MultiTierVPC", "public_subnet_id_1").into(),
            security_group: Ref::new("server", "WebServerSecurityGroup", "security_group_id")
                .into(),
            role: Ref::new("server", "WebServerRole", "role_name").into(),
            user_data: Some(user_data),
        }
    }

    #[test]
    fn user_data_renders_with_shebang() {
        let instance = web_server();
        let rendered = instance.user_data.as_ref().unwrap().render();
        assert!(rendered.starts_with("#!/bin/bash\n"));
        assert!(rendered.contains("yum install -y httpd\n"));
    }

    #[test]
    fn collects_subnet_sg_and_role_references() {
        let refs = web_server().references();
        let attributes: Vec<&str> = refs.iter().map(|r| r.attribute.as_str()).collect();
        assert_eq!(
            attributes,
            vec!["public_subnet_id_1", "security_group_id", "role_name"]
        );
    }

    #[test]
    fn malformed_instance_type_is_invalid() {
        let mut instance = web_server();
        instance.instance_type = "t2micro".to_string();
        assert!(instance.validate().is_err());
    }
}
