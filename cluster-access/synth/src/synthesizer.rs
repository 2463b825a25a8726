use crate::{table::RuleTable, SynthesizeError};
use ahash::AHashMap as HashMap;
use cluster_access_core::{
    AccessPolicy, PortRange, Protocol, Purpose, ResolveGroups, ResolveNodePortRange, Role,
    RuleKey, RuleSpec, TargetGroup, Topology, Warn,
};
use std::collections::hash_map::Entry;
use tracing::{debug, info, instrument};

/// Derives the ingress rules implied by a cluster's access policy.
///
/// A synthesizer only borrows its collaborators; it holds no state between calls.
#[derive(Clone, Copy)]
pub struct Synthesizer<'a> {
    groups: &'a dyn ResolveGroups,
    topology: &'a dyn Topology,
    node_ports: &'a dyn ResolveNodePortRange,
    warn: &'a dyn Warn,
}

/// Synthesizes the rules for `policy` with a one-off [`Synthesizer`].
pub fn synthesize(
    policy: &AccessPolicy,
    groups: &dyn ResolveGroups,
    topology: &dyn Topology,
    node_ports: &dyn ResolveNodePortRange,
    warn: &dyn Warn,
) -> Result<Vec<RuleSpec>, SynthesizeError> {
    Synthesizer::new(groups, topology, node_ports, warn).synthesize(policy)
}

// === impl Synthesizer ===

impl<'a> Synthesizer<'a> {
    pub fn new(
        groups: &'a dyn ResolveGroups,
        topology: &'a dyn Topology,
        node_ports: &'a dyn ResolveNodePortRange,
        warn: &'a dyn Warn,
    ) -> Self {
        Self {
            groups,
            topology,
            node_ports,
            warn,
        }
    }

    /// Produces the complete, canonically ordered set of rules for `policy`.
    ///
    /// Fails if the security groups for either role or the NodePort range cannot be resolved,
    /// in which case no rules are returned.
    #[instrument(
        skip_all,
        fields(
            ssh = policy.ssh_access.len(),
            api = policy.api_access.len(),
            nodeport = policy.node_port_access.len(),
        )
    )]
    pub fn synthesize(&self, policy: &AccessPolicy) -> Result<Vec<RuleSpec>, SynthesizeError> {
        if policy.api_access.is_empty() {
            self.warn.warn(
                "KubernetesAPIAccess is empty; the API will not be reachable from outside the cluster",
            );
        }
        if policy.ssh_access.is_empty() {
            self.warn.warn(
                "SSHAccess is empty; instances will not be reachable over SSH from outside the cluster",
            );
        }

        let masters = self.resolve_groups(Role::ControlPlane)?;
        let nodes = self.resolve_groups(Role::Worker)?;

        let mut table = RuleTable::default();
        self.add_ssh(policy, &masters, &nodes, &mut table);
        self.add_node_ports(policy, &nodes, &mut table)?;
        self.add_https(policy, &masters, &mut table);

        info!(rules = table.len(), "Synthesized ingress rules");
        Ok(table.into_rules())
    }

    /// Resolves the groups for `role`. Distinct groups of a role must not share a suffix, since
    /// the suffix is all that distinguishes the names of their rules.
    fn resolve_groups(&self, role: Role) -> Result<Vec<TargetGroup>, SynthesizeError> {
        let groups = self
            .groups
            .groups_for_role(role)
            .map_err(|source| SynthesizeError::ResolveGroups { role, source })?;
        if groups.is_empty() {
            return Err(SynthesizeError::NoGroups { role });
        }

        {
            let mut suffixes = HashMap::with_capacity(groups.len());
            for group in &groups {
                match suffixes.entry(group.suffix.as_str()) {
                    Entry::Vacant(entry) => {
                        entry.insert(group.id.as_str());
                    }
                    Entry::Occupied(entry) if *entry.get() != group.id => {
                        return Err(SynthesizeError::SharedSuffix {
                            role,
                            suffix: group.suffix.clone(),
                            first: entry.get().to_string(),
                            second: group.id.clone(),
                        });
                    }
                    Entry::Occupied(_) => {}
                }
            }
        }

        debug!(%role, groups = groups.len(), "Resolved security groups");
        Ok(groups)
    }

    /// SSH is open to the configured sources on every instance, unless a bastion is in use.
    ///
    /// A bastion shuts down direct access to control-plane and worker instances entirely.
    fn add_ssh(
        &self,
        policy: &AccessPolicy,
        masters: &[TargetGroup],
        nodes: &[TargetGroup],
        table: &mut RuleTable,
    ) {
        if self.topology.uses_bastion() {
            debug!("Bastion is in use; not configuring SSH access to master or node instances");
            return;
        }

        for source in &policy.ssh_access {
            let groups = masters
                .iter()
                .map(|g| (Role::ControlPlane, g))
                .chain(nodes.iter().map(|g| (Role::Worker, g)));
            for (role, group) in groups {
                let key = RuleKey {
                    purpose: Purpose::Ssh,
                    role,
                    group: group.clone(),
                    protocol: Protocol::Tcp,
                    ports: PortRange::SSH,
                };
                table.merge(key, source.clone());
            }
        }
    }

    /// The NodePort range is open to the configured sources on every worker instance,
    /// regardless of how the cluster is fronted.
    fn add_node_ports(
        &self,
        policy: &AccessPolicy,
        nodes: &[TargetGroup],
        table: &mut RuleTable,
    ) -> Result<(), SynthesizeError> {
        if policy.node_port_access.is_empty() {
            return Ok(());
        }

        let ports = self
            .node_ports
            .node_port_range()
            .map_err(SynthesizeError::ResolveNodePortRange)?
            .ports()?;
        debug!(%ports, "Resolved NodePort range");

        for source in &policy.node_port_access {
            for group in nodes {
                for protocol in [Protocol::Tcp, Protocol::Udp] {
                    let key = RuleKey {
                        purpose: Purpose::NodePort,
                        role: Role::Worker,
                        group: group.clone(),
                        protocol,
                        ports,
                    };
                    table.insert(key, source.clone());
                }
            }
        }

        Ok(())
    }

    /// When the API is not behind a load balancer, clients reach the control-plane instances
    /// directly, so HTTPS must be open to the configured sources on each of them.
    fn add_https(&self, policy: &AccessPolicy, masters: &[TargetGroup], table: &mut RuleTable) {
        if self.topology.api_has_load_balancer() {
            debug!("API uses a load balancer; not configuring HTTPS access to master instances");
            return;
        }

        for source in &policy.api_access {
            for group in masters {
                let key = RuleKey {
                    purpose: Purpose::Https,
                    role: Role::ControlPlane,
                    group: group.clone(),
                    protocol: Protocol::Tcp,
                    ports: PortRange::HTTPS,
                };
                table.merge(key, source.clone());
            }
        }
    }
}
