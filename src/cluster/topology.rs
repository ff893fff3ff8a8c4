use std::collections::HashSet;
use std::fmt;

/// Base URL of a cluster member, e.g. `http://127.0.0.1:8080`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeAddress(String);

impl NodeAddress {
    pub fn new(url: &str) -> Self {
        Self(url.trim().trim_end_matches('/').to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum TopologyError {
    #[error("topology must contain at least one node")]
    Empty,
    #[error("node {0} appears more than once in the topology")]
    Duplicate(String),
    #[error("local node {0} is not part of the topology")]
    MissingSelf(String),
}

/// Ordered, immutable cluster membership as seen by one node.
///
/// Contains the local node exactly once.
#[derive(Debug, Clone)]
pub struct Topology {
    nodes: Vec<NodeAddress>,
    local_index: usize,
}

impl Topology {
    pub fn new<S: AsRef<str>>(nodes: &[S], local: &str) -> Result<Self, TopologyError> {
        if nodes.is_empty() {
            return Err(TopologyError::Empty);
        }

        let nodes: Vec<NodeAddress> = nodes.iter().map(|n| NodeAddress::new(n.as_ref())).collect();
        let mut seen = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !seen.insert(node) {
                return Err(TopologyError::Duplicate(node.to_string()));
            }
        }

        let local = NodeAddress::new(local);
        let local_index = nodes
            .iter()
            .position(|n| n == &local)
            .ok_or_else(|| TopologyError::MissingSelf(local.to_string()))?;

        Ok(Self { nodes, local_index })
    }

    /// A cluster of one.
    pub fn single(local: &str) -> Self {
        Self {
            nodes: vec![NodeAddress::new(local)],
            local_index: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[NodeAddress] {
        &self.nodes
    }

    pub fn local(&self) -> &NodeAddress {
        &self.nodes[self.local_index]
    }

    pub fn is_local(&self, node: &NodeAddress) -> bool {
        node == self.local()
    }

    /// The first `count` members in configured order (not hashed).
    pub fn select(&self, count: usize) -> &[NodeAddress] {
        &self.nodes[..count.min(self.nodes.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_node_found_after_normalization() {
        let topology = Topology::new(
            &["http://a:1/", "http://b:2", "http://c:3"],
            "http://b:2/",
        )
        .unwrap();

        assert_eq!(topology.len(), 3);
        assert_eq!(topology.local().as_str(), "http://b:2");
        assert!(topology.is_local(&NodeAddress::new("http://b:2")));
        assert!(!topology.is_local(&NodeAddress::new("http://a:1")));
    }

    #[test]
    fn test_select_keeps_configured_order() {
        let topology = Topology::new(&["http://c", "http://a", "http://b"], "http://a").unwrap();
        let selected: Vec<&str> = topology.select(2).iter().map(|n| n.as_str()).collect();
        assert_eq!(selected, vec!["http://c", "http://a"]);
        assert_eq!(topology.select(10).len(), 3);
    }

    #[test]
    fn test_rejects_missing_self() {
        let err = Topology::new(&["http://a", "http://b"], "http://z").unwrap_err();
        assert_eq!(err, TopologyError::MissingSelf("http://z".into()));
    }

    #[test]
    fn test_rejects_duplicate_node() {
        let err = Topology::new(&["http://a", "http://a/"], "http://a").unwrap_err();
        assert_eq!(err, TopologyError::Duplicate("http://a".into()));
    }

    #[test]
    fn test_rejects_empty() {
        let nodes: [&str; 0] = [];
        assert_eq!(Topology::new(&nodes, "http://a").unwrap_err(), TopologyError::Empty);
    }
}
