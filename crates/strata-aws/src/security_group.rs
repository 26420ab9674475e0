//! Security group declaration
//!
//! Rules are additive allow-rules only; anything not allowed is denied. There
//! is no explicit deny.

use crate::naming::derived_id;
use std::net::Ipv4Addr;
use strata_core::{Input, Ref, Resource, Result, SynthContext};

/// Traffic source for an ingress rule
#[derive(Debug, Clone)]
pub enum Peer {
    /// 0.0.0.0/0
    AnyIpv4,
    /// An IPv4 range in CIDR notation
    Ipv4(String),
    /// Another security group, concrete or referenced
    Group(Input),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
}

impl Protocol {
    fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Icmp => "icmp",
        }
    }
}

/// Single allow-rule
#[derive(Debug, Clone)]
pub struct IngressRule {
    pub peer: Peer,
    pub protocol: Protocol,
    pub from_port: u16,
    pub to_port: u16,
    pub description: String,
}

impl IngressRule {
    /// Allow a single TCP port from `peer`
    pub fn tcp(port: u16, peer: Peer, description: impl Into<String>) -> Self {
        Self {
            peer,
            protocol: Protocol::Tcp,
            from_port: port,
            to_port: port,
            description: description.into(),
        }
    }
}

/// Security group bound to a VPC
#[derive(Debug, Clone)]
pub struct SecurityGroup {
    pub vpc: Input,
    pub description: String,
    pub allow_all_outbound: bool,
    pub ingress: Vec<IngressRule>,
}

impl SecurityGroup {
    pub fn new(vpc: impl Into<Input>, description: impl Into<String>) -> Self {
        Self {
            vpc: vpc.into(),
            description: description.into(),
            allow_all_outbound: true,
            ingress: Vec::new(),
        }
    }

    pub fn add_ingress_rule(&mut self, rule: IngressRule) {
        self.ingress.push(rule);
    }
}

fn valid_cidr(cidr: &str) -> bool {
    let Some((addr, prefix)) = cidr.split_once('/') else {
        return false;
    };
    addr.parse::<Ipv4Addr>().is_ok() && prefix.parse::<u8>().map(|p| p <= 32).unwrap_or(false)
}

impl Resource for SecurityGroup {
    fn kind(&self) -> &'static str {
        "security-group"
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.description.is_empty() {
            return Err("description must not be empty".to_string());
        }
        for rule in &self.ingress {
            if rule.protocol != Protocol::Icmp {
                if rule.from_port == 0 {
                    return Err(format!("invalid port range: port 0 ({})", rule.description));
                }
                if rule.from_port > rule.to_port {
                    return Err(format!(
                        "invalid port range: {}-{} ({})",
                        rule.from_port, rule.to_port, rule.description
                    ));
                }
            }
            if let Peer::Ipv4(cidr) = &rule.peer {
                if !valid_cidr(cidr) {
                    return Err(format!("invalid peer CIDR '{cidr}'"));
                }
            }
        }
        Ok(())
    }

    fn references(&self) -> Vec<Ref> {
        let mut refs: Vec<Ref> = self.vpc.as_handle().cloned().into_iter().collect();
        for rule in &self.ingress {
            if let Peer::Group(input) = &rule.peer {
                refs.extend(input.as_handle().cloned());
            }
        }
        refs
    }

    fn properties(&self, ctx: &SynthContext<'_>) -> Result<serde_json::Value> {
        let mut ingress = Vec::with_capacity(self.ingress.len());
        for rule in &self.ingress {
            let source = match &rule.peer {
                Peer::AnyIpv4 => serde_json::json!("0.0.0.0/0"),
                Peer::Ipv4(cidr) => serde_json::json!(cidr),
                Peer::Group(input) => ctx.resolve(input)?,
            };
            ingress.push(serde_json::json!({
                "protocol": rule.protocol.as_str(),
                "from_port": rule.from_port,
                "to_port": rule.to_port,
                "source": source,
                "description": rule.description,
            }));
        }

        Ok(serde_json::json!({
            "vpc_id": ctx.resolve(&self.vpc)?,
            "description": self.description,
            "allow_all_outbound": self.allow_all_outbound,
            "ingress": ingress,
        }))
    }

    fn exports(&self, ctx: &SynthContext<'_>) -> Vec<(String, serde_json::Value)> {
        vec![(
            "security_group_id".to_string(),
            serde_json::json!(derived_id("sg", ctx)),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web_sg() -> SecurityGroup {
        let mut sg = SecurityGroup::new(
            Ref::new("network", "MultiTierVPC", "vpc_id"),
            "Security group for web servers",
        );
        sg.add_ingress_rule(IngressRule::tcp(
            80,
            Peer::AnyIpv4,
            "Allow HTTP traffic from anywhere",
        ));
        sg
    }

    #[test]
    fn collects_vpc_and_peer_references() {
        let mut sg = web_sg();
        sg.add_ingress_rule(IngressRule::tcp(
            3306,
            Peer::Group(Ref::new("server", "WebServerSecurityGroup", "security_group_id").into()),
            "Allow MySQL traffic from web servers only",
        ));
        let refs = sg.references();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].attribute, "vpc_id");
        assert_eq!(refs[1].attribute, "security_group_id");
    }

    #[test]
    fn empty_port_range_is_invalid() {
        let mut sg = web_sg();
        sg.add_ingress_rule(IngressRule {
            peer: Peer::AnyIpv4,
            protocol: Protocol::Tcp,
            from_port: 443,
            to_port: 80,
            description: "backwards".to_string(),
        });
        assert!(sg.validate().unwrap_err().contains("invalid port range"));
    }

    #[test]
    fn port_zero_is_invalid() {
        let mut sg = web_sg();
        sg.add_ingress_rule(IngressRule::tcp(0, Peer::AnyIpv4, "zero"));
        assert!(sg.validate().is_err());
    }

    #[test]
    fn bad_peer_cidr_is_invalid() {
        let mut sg = web_sg();
        sg.add_ingress_rule(IngressRule::tcp(22, Peer::Ipv4("10.0.0/8".to_string()), "ssh"));
        assert!(sg.validate().unwrap_err().contains("invalid peer CIDR"));
    }

    #[test]
    fn well_formed_group_passes() {
        assert!(web_sg().validate().is_ok());
    }
}
