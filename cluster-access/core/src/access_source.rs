use crate::PREFIX_LIST_PREFIX;
use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single entry of an access list: either a literal network or a reference to a
/// provider-managed prefix list.
///
/// Sources are ordered canonically: networks sort before prefix lists, networks sort by address
/// family, address, and prefix length, and prefix lists sort by identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AccessSource {
    Cidr(IpNet),
    PrefixList(String),
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid access source {value:?}: must be a CIDR block or a `pl-` prefix list id")]
pub struct InvalidAccessSource {
    value: String,
}

// === impl AccessSource ===

impl std::str::FromStr for AccessSource {
    type Err = InvalidAccessSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with(PREFIX_LIST_PREFIX) {
            return Ok(Self::PrefixList(s.to_string()));
        }

        s.parse::<IpNet>()
            .map(Self::from)
            .map_err(|_| InvalidAccessSource {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for AccessSource {
    type Error = InvalidAccessSource;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AccessSource> for String {
    fn from(src: AccessSource) -> Self {
        src.to_string()
    }
}

impl fmt::Display for AccessSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cidr(net) => net.fmt(f),
            Self::PrefixList(id) => id.fmt(f),
        }
    }
}

impl From<IpNet> for AccessSource {
    fn from(net: IpNet) -> Self {
        Self::Cidr(net)
    }
}
