//! VPC declaration: address range, subnet groups, NAT gateways
//!
//! The declared range is carved deterministically: subnet groups expand to one
//! subnet per fault domain, allocated sequentially from the start of the VPC
//! range in declaration order. Public subnets get an internet-facing route;
//! private subnets route egress through the NAT gateways only.

use crate::naming::{derived_id, slug};
use std::net::Ipv4Addr;
use strata_core::{Resource, Result, SynthContext};

/// Whether a subnet group is internet-facing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubnetKind {
    /// Internet-facing route
    Public,
    /// Egress only, through a NAT gateway
    PrivateWithEgress,
}

impl SubnetKind {
    fn as_str(&self) -> &'static str {
        match self {
            SubnetKind::Public => "public",
            SubnetKind::PrivateWithEgress => "private-with-egress",
        }
    }

    fn route(&self) -> &'static str {
        match self {
            SubnetKind::Public => "internet-gateway",
            SubnetKind::PrivateWithEgress => "nat-gateway",
        }
    }
}

/// Named subnet group, expanded to one subnet per fault domain
#[derive(Debug, Clone)]
pub struct SubnetGroup {
    pub name: String,
    pub kind: SubnetKind,
    pub cidr_mask: u8,
}

/// Virtual network declaration
#[derive(Debug, Clone)]
pub struct Vpc {
    /// Address range, e.g. "10.0.0.0/16"
    pub cidr: String,

    /// Number of fault domains to spread subnets across
    pub max_azs: usize,

    /// NAT gateways for private-subnet egress
    pub nat_gateways: usize,

    pub subnets: Vec<SubnetGroup>,
}

/// One concrete subnet after carving
struct CarvedSubnet {
    group: String,
    kind: SubnetKind,
    fault_domain: usize,
    cidr: String,
}

fn parse_cidr(cidr: &str) -> std::result::Result<(u32, u8), String> {
    let malformed = || format!("malformed CIDR '{cidr}'");
    let (addr, prefix) = cidr.split_once('/').ok_or_else(malformed)?;
    let addr: Ipv4Addr = addr.parse().map_err(|_| malformed())?;
    let prefix: u8 = prefix.parse().map_err(|_| malformed())?;
    if prefix > 32 {
        return Err(format!("CIDR prefix /{prefix} out of range"));
    }
    Ok((u32::from(addr), prefix))
}

fn format_cidr(base: u32, prefix: u8) -> String {
    format!("{}/{}", Ipv4Addr::from(base), prefix)
}

impl Vpc {
    /// Expand subnet groups into concrete per-domain subnets
    fn carve(&self) -> std::result::Result<Vec<CarvedSubnet>, String> {
        let (base, prefix) = parse_cidr(&self.cidr)?;
        let vpc_base = u64::from(base & (u32::MAX << (32 - prefix)));
        let vpc_size = 1u64 << (32 - prefix);

        let mut cursor = 0u64;
        let mut carved = Vec::new();
        for group in &self.subnets {
            let block = 1u64 << (32 - group.cidr_mask);
            for fault_domain in 0..self.max_azs {
                // Align to the block size in case groups use mixed masks.
                cursor = cursor.div_ceil(block) * block;
                if cursor + block > vpc_size {
                    return Err(format!(
                        "subnet group '{}' does not fit in {}",
                        group.name, self.cidr
                    ));
                }
                carved.push(CarvedSubnet {
                    group: group.name.clone(),
                    kind: group.kind,
                    fault_domain: fault_domain + 1,
                    cidr: format_cidr((vpc_base + cursor) as u32, group.cidr_mask),
                });
                cursor += block;
            }
        }
        Ok(carved)
    }

    fn subnet_id(&self, ctx: &SynthContext<'_>, subnet: &CarvedSubnet) -> String {
        format!(
            "subnet-{}-{}-az{}",
            slug(ctx.stack()),
            slug(&subnet.group),
            subnet.fault_domain
        )
    }
}

impl Resource for Vpc {
    fn kind(&self) -> &'static str {
        "vpc"
    }

    fn validate(&self) -> std::result::Result<(), String> {
        let (_, prefix) = parse_cidr(&self.cidr)?;
        if !(8..=28).contains(&prefix) {
            return Err(format!("VPC prefix /{prefix} must be within /8 and /28"));
        }
        if !(1..=4).contains(&self.max_azs) {
            return Err(format!("max_azs must be 1..=4, got {}", self.max_azs));
        }

        let mut seen = Vec::new();
        for group in &self.subnets {
            if group.name.is_empty() {
                return Err("subnet group name must not be empty".to_string());
            }
            if seen.contains(&&group.name) {
                return Err(format!("duplicate subnet group '{}'", group.name));
            }
            seen.push(&group.name);
            if group.cidr_mask <= prefix || group.cidr_mask > 28 {
                return Err(format!(
                    "subnet mask /{} must be within /{} and /28",
                    group.cidr_mask, prefix
                ));
            }
        }

        let has_private = self
            .subnets
            .iter()
            .any(|g| g.kind == SubnetKind::PrivateWithEgress);
        if has_private && self.nat_gateways == 0 {
            return Err("private subnets require at least one NAT gateway".to_string());
        }

        // Fit check happens here so synthesis cannot fail on carving.
        self.carve()?;
        Ok(())
    }

    fn properties(&self, ctx: &SynthContext<'_>) -> Result<serde_json::Value> {
        let carved = self
            .carve()
            .map_err(|message| strata_core::SynthError::Validation {
                stack: ctx.stack().to_string(),
                resource: ctx.resource().to_string(),
                message,
            })?;
        tracing::debug!(
            "carved {} into {} subnets across {} fault domains",
            self.cidr,
            carved.len(),
            self.max_azs
        );

        let subnets: Vec<serde_json::Value> = carved
            .iter()
            .map(|s| {
                serde_json::json!({
                    "subnet_id": self.subnet_id(ctx, s),
                    "group": s.group,
                    "kind": s.kind.as_str(),
                    "availability_zone": format!("az{}", s.fault_domain),
                    "cidr": s.cidr,
                    "route": s.kind.route(),
                })
            })
            .collect();

        let nat_gateways: Vec<String> = (1..=self.nat_gateways)
            .map(|n| format!("{}-{}", derived_id("nat", ctx), n))
            .collect();

        Ok(serde_json::json!({
            "cidr": self.cidr,
            "fault_domains": self.max_azs,
            "nat_gateways": nat_gateways,
            "subnets": subnets,
        }))
    }

    fn exports(&self, ctx: &SynthContext<'_>) -> Vec<(String, serde_json::Value)> {
        // validate() ran before this stack synthesized, so carving cannot fail.
        let Ok(carved) = self.carve() else {
            return Vec::new();
        };
        let mut exports = vec![(
            "vpc_id".to_string(),
            serde_json::json!(derived_id("vpc", ctx)),
        )];

        for kind in [SubnetKind::Public, SubnetKind::PrivateWithEgress] {
            let ids: Vec<String> = carved
                .iter()
                .filter(|s| s.kind == kind)
                .map(|s| self.subnet_id(ctx, s))
                .collect();
            let label = match kind {
                SubnetKind::Public => "public",
                SubnetKind::PrivateWithEgress => "private",
            };
            for (i, id) in ids.iter().enumerate() {
                exports.push((
                    format!("{}_subnet_id_{}", label, i + 1),
                    serde_json::json!(id),
                ));
            }
            exports.push((format!("{label}_subnet_ids"), serde_json::json!(ids)));
        }
        exports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{App, Stack};

    fn two_tier_vpc() -> Vpc {
        Vpc {
            cidr: "10.0.0.0/16".to_string(),
            max_azs: 2,
            nat_gateways: 1,
            subnets: vec![
                SubnetGroup {
                    name: "PublicSubnet".to_string(),
                    kind: SubnetKind::Public,
                    cidr_mask: 24,
                },
                SubnetGroup {
                    name: "PrivateSubnet".to_string(),
                    kind: SubnetKind::PrivateWithEgress,
                    cidr_mask: 24,
                },
            ],
        }
    }

    fn synth_one(vpc: Vpc) -> strata_core::StackArtifact {
        let mut stack = Stack::new("network");
        stack.add_resource("MultiTierVPC", vpc).unwrap();
        let mut app = App::new();
        app.add_stack(stack).unwrap();
        app.synth().unwrap().get("network").unwrap().clone()
    }

    #[test]
    fn carves_sequential_blocks_per_fault_domain() {
        let artifact = synth_one(two_tier_vpc());
        let subnets = artifact.resources[0].properties["subnets"]
            .as_array()
            .unwrap()
            .clone();
        assert_eq!(subnets.len(), 4);
        assert_eq!(subnets[0]["cidr"], "10.0.0.0/24");
        assert_eq!(subnets[1]["cidr"], "10.0.1.0/24");
        assert_eq!(subnets[2]["cidr"], "10.0.2.0/24");
        assert_eq!(subnets[3]["cidr"], "10.0.3.0/24");
        assert_eq!(subnets[0]["route"], "internet-gateway");
        assert_eq!(subnets[2]["route"], "nat-gateway");
        assert_eq!(subnets[1]["availability_zone"], "az2");
    }

    #[test]
    fn malformed_cidr_fails_validation() {
        let mut vpc = two_tier_vpc();
        vpc.cidr = "10.0.0/16".to_string();
        assert!(vpc.validate().unwrap_err().contains("malformed CIDR"));
    }

    #[test]
    fn subnet_mask_must_be_smaller_than_vpc_range() {
        let mut vpc = two_tier_vpc();
        vpc.subnets[0].cidr_mask = 16;
        assert!(vpc.validate().is_err());
    }

    #[test]
    fn private_subnets_require_nat_gateway() {
        let mut vpc = two_tier_vpc();
        vpc.nat_gateways = 0;
        assert!(vpc.validate().unwrap_err().contains("NAT gateway"));
    }

    #[test]
    fn oversized_groups_do_not_fit() {
        let mut vpc = two_tier_vpc();
        vpc.cidr = "10.0.0.0/24".to_string();
        vpc.subnets[0].cidr_mask = 25;
        vpc.subnets[1].cidr_mask = 25;
        // 4 x /25 cannot fit a /24
        assert!(vpc.validate().unwrap_err().contains("does not fit"));
    }

    #[test]
    fn exports_cover_both_subnet_kinds() {
        let mut network = Stack::new("network");
        network.add_resource("MultiTierVPC", two_tier_vpc()).unwrap();

        struct Probe;
        impl Resource for Probe {
            fn kind(&self) -> &'static str {
                "probe"
            }
            fn references(&self) -> Vec<strata_core::Ref> {
                vec![strata_core::Ref::new("network", "MultiTierVPC", "public_subnet_ids")]
            }
            fn properties(&self, ctx: &SynthContext<'_>) -> Result<serde_json::Value> {
                ctx.resolve_ref(&strata_core::Ref::new(
                    "network",
                    "MultiTierVPC",
                    "public_subnet_ids",
                ))
            }
        }

        let mut probe = Stack::new("probe");
        probe.add_resource("probe", Probe).unwrap();

        let mut app = App::new();
        app.add_stack(network).unwrap();
        app.add_stack(probe).unwrap();
        let assembly = app.synth().unwrap();
        let ids = assembly.get("probe").unwrap().resources[0]
            .properties
            .as_array()
            .unwrap()
            .clone();
        assert_eq!(
            ids,
            vec![
                serde_json::json!("subnet-network-publicsubnet-az1"),
                serde_json::json!("subnet-network-publicsubnet-az2"),
            ]
        );
    }
}
