//! Network stack: VPC with public and private subnets across two fault domains

use strata_aws::{SubnetGroup, SubnetKind, Vpc};
use strata_core::{Ref, Result, Stack};

pub const NETWORK_STACK: &str = "network";

const VPC_ID: &str = "MultiTierVPC";

/// Handle to the network stack, injected into dependent stacks
///
/// All methods hand out symbolic references; nothing resolves until the
/// consuming stack synthesizes.
pub struct NetworkHandle;

impl NetworkHandle {
    pub fn vpc_id(&self) -> Ref {
        Ref::new(NETWORK_STACK, VPC_ID, "vpc_id")
    }

    /// 1-based public subnet, one per fault domain
    pub fn public_subnet(&self, n: usize) -> Ref {
        Ref::new(NETWORK_STACK, VPC_ID, format!("public_subnet_id_{n}"))
    }

    pub fn private_subnet_ids(&self) -> Ref {
        Ref::new(NETWORK_STACK, VPC_ID, "private_subnet_ids")
    }
}

/// Declare the VPC: 10.0.0.0/16, /24 subnets in each of 2 fault domains,
/// one NAT gateway for private egress
pub fn network_stack() -> Result<(Stack, NetworkHandle)> {
    let mut stack = Stack::new(NETWORK_STACK);
    stack.add_resource(
        VPC_ID,
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
        },
    )?;
    Ok((stack, NetworkHandle))
}
