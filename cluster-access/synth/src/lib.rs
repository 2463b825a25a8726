//! Cluster access-rule synthesis
//!
//! The synthesizer derives the ingress rules that must exist on a cluster's control-plane and
//! worker security groups from its external access policy:
//!
//! - Each `sshAccess` source may reach port 22/tcp on every control-plane and worker group,
//!   unless SSH is funneled through a bastion.
//! - Each `nodePortAccess` source may reach the NodePort range, over both TCP and UDP, on every
//!   worker group.
//! - Each `kubernetesApiAccess` source may reach port 443/tcp on every control-plane group,
//!   unless the API is fronted by a load balancer.
//!
//! ```text
//! [ AccessPolicy ] x [ TargetGroup ] -> [ RuleTable ] -> [ RuleSpec ]
//! ```
//!
//! SSH and API rules that differ only in their source are folded into a single rule whose
//! sources are the union of both. NodePort rules are inserted as-is, one rule per source.
//!
//! Every call builds its own rule table, so a synthesizer may be shared freely between clusters
//! and threads.

#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

mod error;
mod synthesizer;
mod table;


pub use self::{
    error::SynthesizeError,
    synthesizer::{synthesize, Synthesizer},
};
