#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use cluster_access_core as core;
pub use cluster_access_synth as synth;

mod args;
mod config;
mod log;
mod ports;

pub use self::{
    args::Args,
    config::{ClusterConfig, SecurityGroups, TopologyConfig},
    log::LogFormat,
    ports::parse_node_port_range,
};
