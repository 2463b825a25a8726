use crate::ports::parse_node_port_range;
use anyhow::{Context, Result};
use cluster_access_core::{
    AccessPolicy, NodePortRange, ResolveGroups, ResolveNodePortRange, Role, TargetGroup,
    Topology,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Describes a single cluster: its access policy, how it is reached, and the security groups
/// protecting its instances.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ClusterConfig {
    #[serde(default)]
    pub access: AccessPolicy,

    #[serde(default)]
    pub topology: TopologyConfig,

    /// The API server's `--service-node-port-range`. The Kubernetes default applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_node_port_range: Option<String>,

    pub security_groups: SecurityGroups,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TopologyConfig {
    /// Indicates that SSH to instances goes through a bastion host.
    #[serde(default)]
    pub bastion: bool,

    /// Indicates that the Kubernetes API is served through a load balancer.
    #[serde(default)]
    pub api_load_balancer: bool,
}

/// Security groups by instance role.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SecurityGroups {
    #[serde(default)]
    pub master: Vec<TargetGroup>,

    #[serde(default)]
    pub node: Vec<TargetGroup>,
}

// === impl ClusterConfig ===

impl ClusterConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        let config = serde_json::from_reader(std::io::BufReader::new(file))
            .with_context(|| format!("failed to parse {}", path.display()))?;
        debug!(path = %path.display(), "Loaded cluster configuration");
        Ok(config)
    }
}

impl ResolveGroups for ClusterConfig {
    fn groups_for_role(&self, role: Role) -> Result<Vec<TargetGroup>> {
        let groups = match role {
            Role::ControlPlane => &self.security_groups.master,
            Role::Worker => &self.security_groups.node,
        };
        Ok(groups.clone())
    }
}

impl Topology for ClusterConfig {
    fn uses_bastion(&self) -> bool {
        self.topology.bastion
    }

    fn api_has_load_balancer(&self) -> bool {
        self.topology.api_load_balancer
    }
}

impl ResolveNodePortRange for ClusterConfig {
    fn node_port_range(&self) -> Result<NodePortRange> {
        match self.service_node_port_range.as_deref() {
            None => Ok(NodePortRange::DEFAULT),
            Some(range) => parse_node_port_range(range)
                .with_context(|| format!("invalid serviceNodePortRange {range:?}")),
        }
    }
}
