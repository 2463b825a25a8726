use anyhow::{anyhow, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The role of the instances a security group protects.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "master", alias = "control-plane")]
    ControlPlane,

    #[serde(rename = "node", alias = "worker")]
    Worker,
}

/// A security group that rules attach to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetGroup {
    /// Identifies the group to the provisioning layer.
    pub id: String,

    /// Disambiguates rule names when a role has more than one group. Empty for a role's primary
    /// group.
    #[serde(default)]
    pub suffix: String,
}

// === impl Role ===

impl std::str::FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "master" | "control-plane" => Ok(Self::ControlPlane),
            "node" | "worker" => Ok(Self::Worker),
            s => Err(anyhow!("invalid role: {:?}", s)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ControlPlane => "master".fmt(f),
            Self::Worker => "node".fmt(f),
        }
    }
}

// === impl TargetGroup ===

impl TargetGroup {
    pub fn new(id: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            suffix: suffix.into(),
        }
    }

    /// The primary group of a role, which carries no suffix.
    pub fn primary(id: impl Into<String>) -> Self {
        Self::new(id, "")
    }
}
