//! Queries the synthesizer makes against the system that hosts it.
//!
//! Implementations answer from state that has already been resolved; none of these calls should
//! block on I/O.

use crate::{NodePortRange, Role, TargetGroup};
use anyhow::Result;

/// Resolves the security groups that protect instances of a role.
pub trait ResolveGroups {
    fn groups_for_role(&self, role: Role) -> Result<Vec<TargetGroup>>;
}

/// Facts about how the cluster is reached from outside.
pub trait Topology {
    /// Whether administrative SSH is funneled through a bastion host.
    fn uses_bastion(&self) -> bool;

    /// Whether the Kubernetes API is fronted by a load balancer.
    fn api_has_load_balancer(&self) -> bool;
}

/// Resolves the port range used for NodePort services.
pub trait ResolveNodePortRange {
    fn node_port_range(&self) -> Result<NodePortRange>;
}

/// Receives non-fatal policy warnings.
pub trait Warn {
    fn warn(&self, message: &str);
}

/// Emits warnings as `tracing` events.
#[derive(Copy, Clone, Debug, Default)]
pub struct TracingWarn;

// === impl TracingWarn ===

impl Warn for TracingWarn {
    fn warn(&self, message: &str) {
        tracing::warn!("{message}");
    }
}

impl<W: Warn + ?Sized> Warn for &W {
    fn warn(&self, message: &str) {
        (**self).warn(message)
    }
}
