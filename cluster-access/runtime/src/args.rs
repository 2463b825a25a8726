use crate::{ClusterConfig, LogFormat};
use anyhow::{Context, Result};
use clap::Parser;
use cluster_access_core::{RuleSpec, TracingWarn};
use cluster_access_synth::Synthesizer;
use std::{io::Write, path::PathBuf};
use tracing::{info, info_span};

#[derive(Debug, Parser)]
#[clap(
    name = "cluster-access",
    about = "Derives the ingress rules implied by a cluster's external access policy"
)]
pub struct Args {
    #[clap(
        long,
        default_value = "cluster_access=info,warn",
        env = "CLUSTER_ACCESS_LOG"
    )]
    log_level: String,

    #[clap(long, default_value = "plain")]
    log_format: LogFormat,

    /// Path to a JSON cluster configuration.
    #[clap(long, env = "CLUSTER_ACCESS_CONFIG")]
    config: PathBuf,

    /// Indent the emitted rules.
    #[clap(long)]
    pretty: bool,
}

impl Args {
    #[inline]
    pub fn parse_and_run() -> Result<()> {
        Self::parse().run()
    }

    pub fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            config,
            pretty,
        } = self;

        log_format.try_init(&log_level)?;

        let rules = {
            let _span = info_span!("cluster", config = %config.display()).entered();
            let cluster = ClusterConfig::load(&config)?;
            synthesize(&cluster)?
        };
        info!(rules = rules.len(), "Writing ingress rules");

        let mut stdout = std::io::stdout().lock();
        if pretty {
            serde_json::to_writer_pretty(&mut stdout, &rules)?;
        } else {
            serde_json::to_writer(&mut stdout, &rules)?;
        }
        writeln!(stdout)?;
        Ok(())
    }
}

/// Synthesizes the rules for a cluster whose collaborators are all answered by its configuration.
fn synthesize(cluster: &ClusterConfig) -> Result<Vec<RuleSpec>> {
    Synthesizer::new(cluster, cluster, cluster, &TracingWarn)
        .synthesize(&cluster.access)
        .context("failed to synthesize ingress rules")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SecurityGroups, TopologyConfig};
    use cluster_access_core::{AccessPolicy, Purpose, TargetGroup};
    use maplit::btreeset;
    use std::collections::BTreeSet;

    fn cluster() -> ClusterConfig {
        ClusterConfig {
            access: AccessPolicy {
                ssh_access: vec!["10.0.0.0/8".parse().unwrap()],
                api_access: vec!["0.0.0.0/0".parse().unwrap()],
                node_port_access: vec!["192.168.0.0/16".parse().unwrap()],
            },
            topology: TopologyConfig::default(),
            service_node_port_range: None,
            security_groups: SecurityGroups {
                master: vec![TargetGroup::primary("sg-master")],
                node: vec![TargetGroup::primary("sg-node")],
            },
        }
    }

    #[test]
    fn parses_args() {
        let args = Args::try_parse_from([
            "cluster-access",
            "--config",
            "cluster.json",
            "--log-format",
            "json",
            "--pretty",
        ])
        .unwrap();
        assert_eq!(args.config, PathBuf::from("cluster.json"));
        assert_eq!(args.log_format, LogFormat::Json);
        assert!(args.pretty);

        assert!(
            Args::try_parse_from(["cluster-access", "--config", "c.json", "--log-format", "xml"])
                .is_err()
        );
    }

    #[test]
    fn synthesizes_configured_cluster() {
        let rules = synthesize(&cluster()).unwrap();
        let names = rules.iter().map(|r| r.name.as_str()).collect::<BTreeSet<_>>();
        assert_eq!(
            names,
            btreeset![
                "ssh-external-to-master-10.0.0.0/8",
                "ssh-external-to-node-10.0.0.0/8",
                "nodeport-tcp-external-to-node-192.168.0.0/16",
                "nodeport-udp-external-to-node-192.168.0.0/16",
                "https-external-to-master-0.0.0.0/0",
            ]
        );
    }

    #[test]
    fn respects_configured_topology() {
        let cluster = ClusterConfig {
            topology: TopologyConfig {
                bastion: true,
                api_load_balancer: true,
            },
            ..cluster()
        };
        let rules = synthesize(&cluster).unwrap();
        assert!(rules.iter().all(|r| r.purpose == Purpose::NodePort));
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn reports_configuration_errors() {
        let cluster = ClusterConfig {
            service_node_port_range: Some("30000-".to_string()),
            ..cluster()
        };
        let error = synthesize(&cluster).unwrap_err();
        assert_eq!(error.to_string(), "failed to synthesize ingress rules");
        assert!(
            format!("{error:#}").contains("invalid serviceNodePortRange"),
            "{error:#}"
        );
    }

    #[test]
    fn reports_shared_suffixes() {
        let cluster = ClusterConfig {
            security_groups: SecurityGroups {
                node: vec![
                    TargetGroup::primary("sg-node"),
                    TargetGroup::primary("sg-node-b"),
                ],
                ..cluster().security_groups
            },
            ..cluster()
        };
        let error = synthesize(&cluster).unwrap_err();
        assert!(
            format!("{error:#}").contains("node security groups sg-node and sg-node-b"),
            "{error:#}"
        );
    }

    #[test]
    fn serializes_rules() {
        let rules = synthesize(&ClusterConfig {
            access: AccessPolicy {
                ssh_access: vec!["10.0.0.0/8".parse().unwrap(), "pl-0a".parse().unwrap()],
                ..Default::default()
            },
            ..cluster()
        })
        .unwrap();
        let json = serde_json::to_value(&rules[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "ssh-external-to-master-10.0.0.0/8,pl-0a",
                "purpose": "ssh",
                "role": "master",
                "group": { "id": "sg-master", "suffix": "" },
                "protocol": "tcp",
                "ports": { "from": 22, "to": 22 },
                "sources": ["10.0.0.0/8", "pl-0a"],
            })
        );
    }
}
