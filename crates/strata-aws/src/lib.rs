//! Typed AWS resource declarations for Strata
//!
//! Each resource kind is a typed record implementing the core
//! [`Resource`](strata_core::Resource) trait: properties are validated at
//! synthesis entry, cross-stack values are [`Input`](strata_core::Input)
//! handles, and every resource exports deterministic derived identifiers so
//! downstream stacks can reference them without a provider round-trip.
//!
//! Covered kinds:
//!
//! - `vpc` — address range carved into public/private subnet groups across
//!   fault domains, with NAT gateways for private egress
//! - `security-group` — additive allow-rules, default-deny otherwise
//! - `iam-role` — service role with managed policies
//! - `instance` — compute instance with an opaque user-data payload
//! - `db-subnet-group` / `db-instance` — managed relational database

pub mod iam;
pub mod instance;
pub mod naming;
pub mod rds;
pub mod security_group;
pub mod vpc;

// Re-exports
pub use iam::Role;
pub use instance::{Instance, MachineImage, UserData};
pub use rds::{Credentials, DbEngine, DbInstance, DbSubnetGroup, RemovalPolicy};
pub use security_group::{IngressRule, Peer, Protocol, SecurityGroup};
pub use vpc::{SubnetGroup, SubnetKind, Vpc};
