use crate::AccessSource;
use serde::{Deserialize, Serialize};

/// Describes which sources may reach the cluster from outside, per purpose.
///
/// An empty list means no external access for that purpose.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AccessPolicy {
    /// Sources allowed to SSH to control-plane and worker instances.
    #[serde(default, rename = "sshAccess")]
    pub ssh_access: Vec<AccessSource>,

    /// Sources allowed to reach the Kubernetes API on control-plane instances.
    #[serde(default, rename = "kubernetesApiAccess", alias = "apiAccess")]
    pub api_access: Vec<AccessSource>,

    /// Sources allowed to reach NodePort services on worker instances.
    #[serde(default)]
    pub node_port_access: Vec<AccessSource>,
}
