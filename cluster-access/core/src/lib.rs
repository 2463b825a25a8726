//! Types shared by the cluster access-rule synthesizer and the systems that feed it.
//!
//! Nothing in this crate talks to a network API: the collaborator traits describe already
//! resolved facts about a cluster (its security groups, its topology, its NodePort range) and
//! the value types describe the ingress rules derived from them.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod access_source;
pub mod discover;
mod group;
mod policy;
pub mod rule;

pub use self::{
    access_source::{AccessSource, InvalidAccessSource},
    discover::{ResolveGroups, ResolveNodePortRange, Topology, TracingWarn, Warn},
    group::{Role, TargetGroup},
    policy::AccessPolicy,
    rule::{
        InvalidPortRange, NodePortRange, PortRange, Protocol, Purpose, RuleKey, RuleShape,
        RuleSpec,
    },
};
pub use ipnet::IpNet;

/// The prefix that distinguishes a managed prefix-list reference from a CIDR block.
pub const PREFIX_LIST_PREFIX: &str = "pl-";
