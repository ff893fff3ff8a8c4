//! Node configuration.
//!
//! Flags can also be supplied through `ENTITY_NODE_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::cluster::{ReadReconciliation, Topology, TopologyError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(clap::Parser, Debug)]
#[command(name = "entity-node", about = "Replicated entity storage node")]
pub struct Cli {
    /// Address the HTTP server listens on.
    #[arg(long, env = "ENTITY_NODE_BIND")]
    pub bind: SocketAddr,
    /// Cluster member URL, in topology order. Repeatable; must include this node.
    #[arg(long = "node", env = "ENTITY_NODE_TOPOLOGY", value_delimiter = ',')]
    pub nodes: Vec<String>,
    /// This node's URL as it appears in the topology (default: http://<bind>).
    #[arg(long, env = "ENTITY_NODE_SELF_URL")]
    pub self_url: Option<String>,
    /// Directory holding this node's records. Without it, data lives in memory
    /// and is lost on restart.
    #[arg(long, env = "ENTITY_NODE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,
    /// Upper bound on a single peer call.
    #[arg(long, env = "ENTITY_NODE_PEER_TIMEOUT_MS", default_value_t = 1000)]
    pub peer_timeout_ms: u64,
    /// How GET picks among live values: `newest` or `last-observed`.
    #[arg(long, env = "ENTITY_NODE_READ_RECONCILIATION", default_value = "newest")]
    pub read_reconciliation: ReadReconciliation,
    #[arg(long, env = "ENTITY_NODE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
    #[arg(long, env = "ENTITY_NODE_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

/// Validated startup configuration.
#[derive(Debug)]
pub struct NodeConfig {
    pub bind: SocketAddr,
    pub topology: Topology,
    pub data_dir: Option<PathBuf>,
    pub peer_timeout: Duration,
    pub reconciliation: ReadReconciliation,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl NodeConfig {
    /// Without any `--node`, the node forms a cluster of one.
    pub fn from_cli(cli: Cli) -> Result<Self, TopologyError> {
        let self_url = cli
            .self_url
            .unwrap_or_else(|| format!("http://{}", cli.bind));

        let topology = if cli.nodes.is_empty() {
            Topology::single(&self_url)
        } else {
            Topology::new(cli.nodes.as_slice(), &self_url)?
        };

        Ok(Self {
            bind: cli.bind,
            topology,
            data_dir: cli.data_dir,
            peer_timeout: Duration::from_millis(cli.peer_timeout_ms),
            reconciliation: cli.read_reconciliation,
            log_level: cli.log_level,
            log_format: cli.log_format,
        })
    }
}
