use cluster_access_core::{InvalidPortRange, Role};

/// A configuration error that prevents synthesis. No rules are produced when one occurs.
#[derive(Debug, thiserror::Error)]
pub enum SynthesizeError {
    #[error("failed to resolve security groups for {role} instances")]
    ResolveGroups {
        role: Role,
        #[source]
        source: anyhow::Error,
    },

    #[error("no security groups found for {role} instances")]
    NoGroups { role: Role },

    #[error("{role} security groups {first} and {second} share the suffix {suffix:?}")]
    SharedSuffix {
        role: Role,
        suffix: String,
        first: String,
        second: String,
    },

    #[error("failed to resolve the NodePort range")]
    ResolveNodePortRange(#[source] anyhow::Error),

    #[error("invalid NodePort range")]
    InvalidNodePortRange(#[from] InvalidPortRange),
}
