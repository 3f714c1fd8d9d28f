use ldpc_core::Side;
use serde::Serialize;

use crate::node::NodeId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportNode {
    pub id: NodeId,
    /// Display name
    pub name: String,
    /// Which side of the bipartition
    pub side: Side,
}

/// Plain node/edge view of a Tanner graph, for plotting tools and graph-exchange
/// converters. Check nodes are listed before variable nodes; edges are
/// (variable id, check id) pairs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphExport {
    pub nodes: Vec<ExportNode>,
    pub edges: Vec<(NodeId, NodeId)>,
}

impl GraphExport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
