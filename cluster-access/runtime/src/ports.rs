use anyhow::{bail, Context, Result};
use cluster_access_core::NodePortRange;
use std::num::NonZeroU16;

/// Reads a NodePort range in the forms accepted by the Kubernetes API server's
/// `--service-node-port-range` flag: `base-max`, `base+offset`, or a single port.
pub fn parse_node_port_range(s: &str) -> Result<NodePortRange> {
    let s = s.trim();
    if s.is_empty() {
        bail!("NodePort range must not be empty");
    }

    if let Some((floor, ceil)) = s.split_once('-') {
        let floor = parse_port(floor)?;
        let ceil = parse_port(ceil)?;
        if floor > ceil {
            bail!("Port range must be increasing");
        }
        return Ok(NodePortRange {
            base: floor,
            size: ceil - floor + 1,
        });
    }

    if let Some((base, offset)) = s.split_once('+') {
        let base = parse_port(base)?;
        let offset = offset.trim().parse::<u16>().context("parsing offset")?;
        let size = offset
            .checked_add(1)
            .filter(|size| base.checked_add(size - 1).is_some())
            .with_context(|| format!("NodePort range {s} exceeds port 65535"))?;
        return Ok(NodePortRange { base, size });
    }

    Ok(NodePortRange {
        base: parse_port(s)?,
        size: 1,
    })
}

fn parse_port(s: &str) -> Result<u16> {
    let port = s.trim().parse::<NonZeroU16>().context("parsing port")?;
    Ok(port.into())
}
