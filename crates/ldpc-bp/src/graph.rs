use core::fmt;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use ldpc_core::{LdpcErr, Llr, ParityCheckMatrix, Side};

use crate::channel::ChannelModel;
use crate::export::{ExportNode, GraphExport};
use crate::node::{Neighbor, Node, NodeId};

/// Bipartite graph of variable nodes (code bits) and check nodes (parity constraints).
///
/// The graph is the sole owner of node storage. Nodes live in an arena and refer to
/// their neighbours by arena index, so the cyclic variable/check relation never forms
/// reference cycles. Ids come from a counter owned by the graph, starting at 0, so
/// independent graphs do not perturb each other.
pub struct TannerGraph {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
    /// Arena indices of variable nodes, in insertion order
    variables: Vec<usize>,
    /// Arena indices of check nodes, in insertion order
    checks: Vec<usize>,
    /// Undirected edges as (variable id, check id)
    edges: BTreeSet<(NodeId, NodeId)>,
    /// Next id to hand out, None once u32::MAX has been used
    next_id: Option<u32>,
    /// Channel model handed to variable nodes created by this graph
    channel: Arc<dyn ChannelModel>,
    /// Write buffer for one receive phase, committed to the inboxes afterwards
    staging: Vec<Llr>,
}

impl TannerGraph {
    pub fn new(channel: Arc<dyn ChannelModel>) -> Self {
        Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            variables: Vec::new(),
            checks: Vec::new(),
            edges: BTreeSet::new(),
            next_id: Some(0),
            channel,
            staging: Vec::new(),
        }
    }

    /// Build the graph of an M x N parity-check matrix: N variable nodes "v0".."v{N-1}"
    /// in column order, M check nodes "c0".."c{M-1}" in row order, and one edge per
    /// 1-entry. Ordering keys are the column and row indices.
    pub fn from_parity_check_matrix(h: &ParityCheckMatrix, channel: Arc<dyn ChannelModel>) -> Self {
        let mut g = TannerGraph::new(channel);

        // Fresh counter: columns take ids 0..N, rows N..N+M
        let cols = h.num_cols() as u32;
        let var_ids: Vec<NodeId> = (0..cols)
            .map(|i| {
                let name = format!("{}{}", Side::Variable.name_prefix(), i);
                let node = Node::variable(NodeId(i), Some(&name), g.channel.clone()).with_order(i);
                g.insert(node)
            })
            .collect();
        let check_ids: Vec<NodeId> = (0..h.num_rows() as u32)
            .map(|j| {
                let name = format!("{}{}", Side::Check.name_prefix(), j);
                g.insert(Node::check(NodeId(cols + j), Some(&name)).with_order(j))
            })
            .collect();
        g.next_id = cols.checked_add(h.num_rows() as u32);

        for (j, i) in h.iter_ones() {
            g.connect(var_ids[i], check_ids[j]);
        }

        tracing::debug!("built {} from {}x{} parity-check matrix", g, h.num_rows(), h.num_cols());
        g
    }

    /// Hand out a fresh id for a node constructed outside the graph
    pub fn allocate_id(&mut self) -> Result<NodeId, LdpcErr> {
        let id = self.next_id.ok_or(LdpcErr::NodeIdsExhausted)?;
        self.next_id = id.checked_add(1);
        Ok(NodeId(id))
    }

    pub fn add_variable_node(&mut self, name: Option<&str>) -> Result<NodeId, LdpcErr> {
        let id = self.allocate_id()?;
        let node = Node::variable(id, name, self.channel.clone());
        Ok(self.insert(node))
    }

    pub fn add_check_node(&mut self, name: Option<&str>) -> Result<NodeId, LdpcErr> {
        let id = self.allocate_id()?;
        Ok(self.insert(Node::check(id, name)))
    }

    /// Register an externally constructed node. Its id must not be in use yet;
    /// the id counter moves past it so later allocations stay unique.
    pub fn add_node(&mut self, mut node: Node) -> Result<NodeId, LdpcErr> {
        let id = node.id();
        if self.index.contains_key(&id) {
            return Err(LdpcErr::DuplicateNodeId { id: id.0 });
        }
        if self.next_id.is_some_and(|next| id.0 >= next) {
            self.next_id = id.0.checked_add(1);
        }
        // Adjacency is graph-owned; a node cloned from another graph starts unconnected
        node.detach();
        Ok(self.insert(node))
    }

    fn insert(&mut self, node: Node) -> NodeId {
        let id = node.id();
        let idx = self.nodes.len();
        match node.side() {
            Side::Variable => self.variables.push(idx),
            Side::Check => self.checks.push(idx),
        }
        self.index.insert(id, idx);
        self.nodes.push(node);
        id
    }

    fn lookup(&self, id: NodeId, side: Side) -> Result<usize, LdpcErr> {
        match self.index.get(&id) {
            Some(&idx) if self.nodes[idx].side() == side => Ok(idx),
            _ => Err(LdpcErr::UnknownNodeId { side, id: id.0 }),
        }
    }

    /// Connect a variable node and a check node. Fails if either id is not
    /// registered on its side of the graph. Adding an existing edge is a no-op.
    pub fn add_edge(&mut self, variable: NodeId, check: NodeId) -> Result<(), LdpcErr> {
        self.lookup(variable, Side::Variable)?;
        self.lookup(check, Side::Check)?;
        self.connect(variable, check);
        Ok(())
    }

    /// Both ids must already be validated
    fn connect(&mut self, variable: NodeId, check: NodeId) {
        let v_idx = self.index[&variable];
        let c_idx = self.index[&check];
        self.nodes[v_idx].register_neighbor(Neighbor { id: check, index: c_idx });
        self.nodes[c_idx].register_neighbor(Neighbor { id: variable, index: v_idx });
        self.edges.insert((variable, check));
    }

    /// Bulk edge insertion by id. All edges are validated before any is added.
    pub fn add_edges<I>(&mut self, edges: I) -> Result<(), LdpcErr>
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let edges: Vec<(NodeId, NodeId)> = edges.into_iter().collect();
        for &(v, c) in &edges {
            self.lookup(v, Side::Variable)?;
            self.lookup(c, Side::Check)?;
        }
        for (v, c) in edges {
            self.connect(v, c);
        }
        Ok(())
    }

    /// Bulk edge insertion by display name. A name matching no node of its side
    /// fails with UnknownNodeName, one matching several nodes with AmbiguousName.
    /// Nothing is added unless every name resolves.
    pub fn add_edges_by_name<I, S, T>(&mut self, edges: I) -> Result<(), LdpcErr>
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let resolved = edges
            .into_iter()
            .map(|(v, c)| -> Result<(NodeId, NodeId), LdpcErr> {
                Ok((
                    self.resolve_name(v.as_ref(), Side::Variable)?,
                    self.resolve_name(c.as_ref(), Side::Check)?,
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        for (v, c) in resolved {
            self.connect(v, c);
        }
        Ok(())
    }

    fn resolve_name(&self, name: &str, side: Side) -> Result<NodeId, LdpcErr> {
        let side_nodes = match side {
            Side::Variable => &self.variables,
            Side::Check => &self.checks,
        };
        let mut matches = side_nodes.iter().map(|&idx| &self.nodes[idx]).filter(|n| n.name() == name);
        let Some(first) = matches.next() else {
            return Err(LdpcErr::UnknownNodeName { side, name: name.to_string() });
        };
        let extra = matches.count();
        if extra > 0 {
            return Err(LdpcErr::AmbiguousName { side, name: name.to_string(), matches: extra + 1 });
        }
        Ok(first.id())
    }

    /// Edge set as (variable id, check id) pairs
    pub fn edges(&self) -> &BTreeSet<(NodeId, NodeId)> {
        &self.edges
    }

    /// Edge set as (variable name, check name) pairs
    pub fn edges_by_name(&self) -> BTreeSet<(String, String)> {
        self.edges
            .iter()
            .map(|(v, c)| (self.nodes[self.index[v]].name(), self.nodes[self.index[c]].name()))
            .collect()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index.get(&id).map(|&idx| &self.nodes[idx])
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.index.get(&id).map(|&idx| &mut self.nodes[idx])
    }

    pub fn num_variable_nodes(&self) -> usize {
        self.variables.len()
    }

    pub fn num_check_nodes(&self) -> usize {
        self.checks.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Variable nodes in insertion order
    pub fn variable_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.variables.iter().map(|&idx| &self.nodes[idx])
    }

    /// Check nodes in insertion order
    pub fn check_nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.checks.iter().map(|&idx| &self.nodes[idx])
    }

    /// Variable nodes sorted by ordering key, i.e. in code bit order.
    /// Nodes with equal keys keep their insertion order.
    pub fn ordered_variable_nodes(&self) -> Vec<&Node> {
        let mut v: Vec<&Node> = self.variable_nodes().collect();
        v.sort();
        v
    }

    /// Check nodes sorted by ordering key, i.e. in parity-check row order
    pub fn ordered_check_nodes(&self) -> Vec<&Node> {
        let mut c: Vec<&Node> = self.check_nodes().collect();
        c.sort();
        c
    }

    /// Clear the message state of every check node
    pub fn initialize_check_nodes(&mut self) {
        for &idx in &self.checks {
            self.nodes[idx].initialize(None);
        }
    }

    /// A single node pulls the current outgoing message of each neighbour
    pub fn receive_messages(&mut self, id: NodeId) -> Result<(), LdpcErr> {
        let Some(&idx) = self.index.get(&id) else {
            return Err(LdpcErr::UnknownNode { id: id.0 });
        };
        let node = &self.nodes[idx];
        let inbound: Vec<Llr> = node
            .neighbors()
            .iter()
            .map(|nb| self.nodes[nb.index].message(id))
            .collect();
        self.nodes[idx].store_messages(&inbound);
        Ok(())
    }

    /// Check-to-variable half round: every variable node receives
    pub fn receive_variable_messages(&mut self) {
        self.receive_phase(Side::Variable);
    }

    /// Variable-to-check half round: every check node receives
    pub fn receive_check_messages(&mut self) {
        self.receive_phase(Side::Check);
    }

    /// All receivers on one side read their neighbours' previous-round state into
    /// the staging buffer before any inbox is written, so no node observes a mix
    /// of old and new messages.
    fn receive_phase(&mut self, side: Side) {
        let receivers = match side {
            Side::Variable => &self.variables,
            Side::Check => &self.checks,
        };

        // Read pass
        self.staging.clear();
        for &idx in receivers {
            let node = &self.nodes[idx];
            for nb in node.neighbors() {
                self.staging.push(self.nodes[nb.index].message(node.id()));
            }
        }

        // Write pass
        let mut cursor = 0;
        for &idx in receivers {
            let node = &mut self.nodes[idx];
            let degree = node.degree();
            node.store_messages(&self.staging[cursor..cursor + degree]);
            cursor += degree;
        }
    }

    /// Biadjacency matrix of the graph: rows are check nodes and columns variable
    /// nodes, both in ordering key order.
    pub fn to_parity_check_matrix(&self) -> ParityCheckMatrix {
        let col_of: HashMap<NodeId, usize> = self
            .ordered_variable_nodes()
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id(), i))
            .collect();
        let row_of: HashMap<NodeId, usize> = self
            .ordered_check_nodes()
            .iter()
            .enumerate()
            .map(|(j, n)| (n.id(), j))
            .collect();

        let mut h = ParityCheckMatrix::zeros(row_of.len(), col_of.len());
        for (v, c) in &self.edges {
            h.set(row_of[c], col_of[v], true);
        }
        h
    }

    /// Generic node/edge representation for external visualization
    pub fn export(&self) -> GraphExport {
        let nodes = self
            .check_nodes()
            .chain(self.variable_nodes())
            .map(|n| ExportNode { id: n.id(), name: n.name(), side: n.side() })
            .collect();
        let edges = self.edges.iter().copied().collect();
        GraphExport { nodes, edges }
    }
}

impl fmt::Display for TannerGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Graph with {} nodes and {} edges", self.nodes.len(), self.edges.len())
    }
}
