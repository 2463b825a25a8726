use crate::{AccessSource, Role, TargetGroup};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

/// An inclusive range of ports.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawPortRange")]
pub struct PortRange {
    from: u16,
    to: u16,
}

#[derive(Deserialize)]
struct RawPortRange {
    from: u16,
    to: u16,
}

/// The NodePort range as configured on the cluster: `size` ports starting at `base`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodePortRange {
    pub base: u16,
    pub size: u16,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InvalidPortRange {
    #[error("port range must be increasing: {from}-{to}")]
    Decreasing { from: u16, to: u16 },

    #[error("port 0 is not a valid port")]
    ZeroPort,

    #[error("NodePort range must not be empty")]
    Empty,

    #[error("NodePort range of {size} ports starting at {base} exceeds port 65535")]
    Overflow { base: u16, size: u16 },
}

/// Why a rule exists. Each purpose has its own naming pattern and is merged independently of
/// the others.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Purpose {
    /// Administrative SSH to instances.
    Ssh,

    /// Externally routable Kubernetes services on worker nodes.
    NodePort,

    /// The Kubernetes API served directly by control-plane instances.
    Https,
}

/// Describes an ingress rule apart from its sources: where it attaches, what it opens, and the
/// purpose and role its name is derived from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleKey {
    pub purpose: Purpose,
    pub role: Role,
    pub group: TargetGroup,
    pub protocol: Protocol,
    pub ports: PortRange,
}

/// The shape of an ingress rule as the provider sees it. A security group carries at most one
/// rule per shape and source, whatever role or suffix the group was resolved with.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RuleShape {
    pub group: String,
    pub protocol: Protocol,
    pub ports: PortRange,
}

/// An ingress rule to be provisioned on a security group.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleSpec {
    pub name: String,
    pub purpose: Purpose,
    pub role: Role,
    pub group: TargetGroup,
    pub protocol: Protocol,
    pub ports: PortRange,

    /// Never empty; always in canonical order.
    pub sources: Vec<AccessSource>,
}

// === impl Protocol ===

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => "tcp".fmt(f),
            Self::Udp => "udp".fmt(f),
        }
    }
}

// === impl PortRange ===

impl PortRange {
    pub const SSH: Self = Self::single(22);
    pub const HTTPS: Self = Self::single(443);

    pub fn new(from: u16, to: u16) -> Result<Self, InvalidPortRange> {
        if from > to {
            return Err(InvalidPortRange::Decreasing { from, to });
        }
        Ok(Self { from, to })
    }

    pub const fn single(port: u16) -> Self {
        Self { from: port, to: port }
    }

}

impl TryFrom<RawPortRange> for PortRange {
    type Error = InvalidPortRange;

    fn try_from(RawPortRange { from, to }: RawPortRange) -> Result<Self, Self::Error> {
        Self::new(from, to)
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.from == self.to {
            return self.from.fmt(f);
        }
        write!(f, "{}-{}", self.from, self.to)
    }
}

// === impl NodePortRange ===

impl NodePortRange {
    /// The range a Kubernetes API server uses when none is configured.
    pub const DEFAULT: Self = Self {
        base: 30000,
        size: 2768,
    };

    /// The ports spanned by this range: `[base, base + size - 1]`.
    pub fn ports(&self) -> Result<PortRange, InvalidPortRange> {
        let Self { base, size } = *self;
        if base == 0 {
            return Err(InvalidPortRange::ZeroPort);
        }
        if size == 0 {
            return Err(InvalidPortRange::Empty);
        }
        let to = base
            .checked_add(size - 1)
            .ok_or(InvalidPortRange::Overflow { base, size })?;
        PortRange::new(base, to)
    }
}

// === impl Purpose ===

impl Purpose {
    /// The leading part of the names of rules with this purpose.
    pub fn tag(&self, role: Role, protocol: Protocol) -> String {
        match self {
            Self::Ssh => format!("ssh-external-to-{}", role),
            Self::NodePort => format!("nodeport-{}-external-to-{}", protocol, role),
            Self::Https => format!("https-external-to-{}", role),
        }
    }
}

// === impl RuleKey ===

impl RuleKey {
    pub fn shape(&self) -> RuleShape {
        RuleShape {
            group: self.group.id.clone(),
            protocol: self.protocol,
            ports: self.ports,
        }
    }

    /// Derives the name of a rule with this key and the given sources.
    ///
    /// The name is `{tag}-{sources}{suffix}`, with multiple sources joined by `,` in the order
    /// given.
    pub fn name<'s>(&self, sources: impl IntoIterator<Item = &'s AccessSource>) -> String {
        let sources = sources
            .into_iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}-{}{}",
            self.purpose.tag(self.role, self.protocol),
            sources,
            self.group.suffix
        )
    }
}

// === impl RuleSpec ===

impl RuleSpec {
    /// Builds a rule from its key. `sources` is sorted and deduplicated.
    pub fn new(key: RuleKey, sources: impl IntoIterator<Item = AccessSource>) -> Self {
        let mut sources = sources.into_iter().collect::<Vec<_>>();
        sources.sort();
        sources.dedup();
        debug_assert!(!sources.is_empty(), "rules must have a source");

        let name = key.name(&sources);
        let RuleKey {
            purpose,
            role,
            group,
            protocol,
            ports,
        } = key;
        Self {
            name,
            purpose,
            role,
            group,
            protocol,
            ports,
            sources,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(purpose: Purpose, role: Role, suffix: &str, protocol: Protocol) -> RuleKey {
        RuleKey {
            purpose,
            role,
            group: TargetGroup::new("sg-0", suffix),
            protocol,
            ports: PortRange::SSH,
        }
    }

    #[test]
    fn port_range() {
        assert!(PortRange::new(2, 1).is_err(), "2-1");
        assert_eq!(PortRange::new(1, 1).unwrap(), PortRange::single(1));
        assert_eq!(PortRange::SSH.to_string(), "22");
        assert_eq!(PortRange::new(30000, 32767).unwrap().to_string(), "30000-32767");
    }

    #[test]
    fn node_port_range() {
        assert_eq!(
            NodePortRange::DEFAULT.ports().unwrap(),
            PortRange::new(30000, 32767).unwrap()
        );
        assert_eq!(
            NodePortRange { base: 80, size: 1 }.ports().unwrap(),
            PortRange::single(80)
        );
        assert_eq!(
            NodePortRange { base: 30000, size: 0 }.ports(),
            Err(InvalidPortRange::Empty)
        );
        assert_eq!(
            NodePortRange { base: 0, size: 10 }.ports(),
            Err(InvalidPortRange::ZeroPort)
        );
        assert_eq!(
            NodePortRange {
                base: 65000,
                size: 1000
            }
            .ports(),
            Err(InvalidPortRange::Overflow {
                base: 65000,
                size: 1000
            })
        );
        assert_eq!(
            NodePortRange {
                base: 65535,
                size: 1
            }
            .ports()
            .unwrap(),
            PortRange::single(65535)
        );
    }

    #[test]
    fn names() {
        let src = "10.0.0.0/8".parse::<AccessSource>().unwrap();
        assert_eq!(
            key(Purpose::Ssh, Role::ControlPlane, "", Protocol::Tcp).name([&src]),
            "ssh-external-to-master-10.0.0.0/8"
        );
        assert_eq!(
            key(Purpose::Ssh, Role::Worker, "-a", Protocol::Tcp).name([&src]),
            "ssh-external-to-node-10.0.0.0/8-a"
        );
        assert_eq!(
            key(Purpose::NodePort, Role::Worker, "", Protocol::Udp).name([&src]),
            "nodeport-udp-external-to-node-10.0.0.0/8"
        );
        assert_eq!(
            key(Purpose::Https, Role::ControlPlane, "-b", Protocol::Tcp).name([&src]),
            "https-external-to-master-10.0.0.0/8-b"
        );
    }

    #[test]
    fn shape_ignores_naming() {
        let shape = key(Purpose::Ssh, Role::ControlPlane, "", Protocol::Tcp).shape();
        assert_eq!(
            shape,
            RuleShape {
                group: "sg-0".to_string(),
                protocol: Protocol::Tcp,
                ports: PortRange::SSH,
            }
        );
        assert_eq!(key(Purpose::Ssh, Role::Worker, "-a", Protocol::Tcp).shape(), shape);
        assert_ne!(key(Purpose::Ssh, Role::Worker, "", Protocol::Udp).shape(), shape);
    }

    #[test]
    fn spec_sorts_sources() {
        let rule = RuleSpec::new(
            key(Purpose::Ssh, Role::ControlPlane, "", Protocol::Tcp),
            [
                "pl-a".parse().unwrap(),
                "192.168.0.0/16".parse().unwrap(),
                "10.0.0.0/8".parse().unwrap(),
                "192.168.0.0/16".parse().unwrap(),
            ],
        );
        assert_eq!(rule.name, "ssh-external-to-master-10.0.0.0/8,192.168.0.0/16,pl-a");
        assert_eq!(rule.sources.len(), 3);
        assert_eq!(rule.role, Role::ControlPlane);
        assert_eq!(rule.group, TargetGroup::new("sg-0", ""));
    }
}
