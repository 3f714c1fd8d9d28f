//! Tanner graph nodes and the sum-product message rules.
//!
//! Nodes never hold references to each other. A neighbour is an index into the
//! node arena owned by [`crate::graph::TannerGraph`], together with its id.
//! Each node keeps one inbound message slot per neighbour, holding the LLR that
//! neighbour sent most recently.

use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::Arc;

use ldpc_core::{Llr, Side};
use serde::Serialize;

use crate::channel::ChannelModel;

/// Smallest magnitude fed into phi. Smaller inputs, including exact zeros, are
/// raised to this value, which bounds every check output by phi(PHI_MIN_ARG), about 28.3.
pub const PHI_MIN_ARG: f64 = 1e-12;

/// phi(x) = -log(tanh(x / 2)), self-inverse on x > 0.
/// Inputs are floored at PHI_MIN_ARG so the result is always finite.
/// Large inputs saturate tanh to 1 and give 0.
#[inline]
pub fn phi(x: f64) -> f64 {
    let x = x.max(PHI_MIN_ARG);
    -(x / 2.0).tanh().ln()
}

/// Check-to-variable rule: product of signs times phi(sum of phi(|m|)).
/// A zero message counts as positive. With no inputs the sum is 0 and the
/// output is the bounded maximum phi(PHI_MIN_ARG) with positive sign.
pub fn check_rule<I: IntoIterator<Item = Llr>>(messages: I) -> Llr {
    let mut negative = false;
    let mut sum = 0.0;
    for m in messages {
        if m < 0.0 {
            negative = !negative;
        }
        sum += phi(m.abs());
    }
    let magnitude = phi(sum);
    if negative { -magnitude } else { magnitude }
}

/// Unique node identity, assigned by the owning graph's counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    pub id: NodeId,
    /// Position of the neighbour in the graph's node arena
    pub(crate) index: usize,
}

/// Channel state of a variable node
#[derive(Clone)]
pub struct VariableNode {
    channel: Arc<dyn ChannelModel>,
    symbol: Option<u8>,
    channel_llr: Llr,
}

impl VariableNode {
    pub fn new(channel: Arc<dyn ChannelModel>) -> Self {
        Self { channel, symbol: None, channel_llr: 0.0 }
    }

    /// Last received channel symbol, None before the first initialization
    pub fn symbol(&self) -> Option<u8> {
        self.symbol
    }

    pub fn channel_llr(&self) -> Llr {
        self.channel_llr
    }
}

impl fmt::Debug for VariableNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableNode")
            .field("channel", &self.channel.describe())
            .field("symbol", &self.symbol)
            .field("channel_llr", &self.channel_llr)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Parity constraint, no channel state
    Check,
    Variable(VariableNode),
}

#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    name: Option<String>,
    /// Ordering key, defaults to the id
    order: u32,
    neighbors: Vec<Neighbor>,
    /// Inbound messages, aligned with `neighbors`
    inbox: Vec<Llr>,
    kind: NodeKind,
}

impl Node {
    pub fn check(id: NodeId, name: Option<&str>) -> Self {
        Self::with_kind(id, name, NodeKind::Check)
    }

    pub fn variable(id: NodeId, name: Option<&str>, channel: Arc<dyn ChannelModel>) -> Self {
        Self::with_kind(id, name, NodeKind::Variable(VariableNode::new(channel)))
    }

    fn with_kind(id: NodeId, name: Option<&str>, kind: NodeKind) -> Self {
        Self {
            id,
            name: name.filter(|n| !n.is_empty()).map(str::to_string),
            order: id.0,
            neighbors: Vec::new(),
            inbox: Vec::new(),
            kind,
        }
    }

    /// Replace the ordering key used for comparison and canonical output order
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Display name; the id's string form when no name was given
    pub fn name(&self) -> String {
        match &self.name {
            Some(n) => n.clone(),
            None => self.id.to_string(),
        }
    }

    #[inline]
    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn side(&self) -> Side {
        match self.kind {
            NodeKind::Check => Side::Check,
            NodeKind::Variable(_) => Side::Variable,
        }
    }

    pub fn neighbors(&self) -> &[Neighbor] {
        &self.neighbors
    }

    pub fn neighbor_ids(&self) -> Vec<NodeId> {
        self.neighbors.iter().map(|n| n.id).collect()
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    /// Most recently stored message from `from`, if it is a neighbour
    pub fn received_message(&self, from: NodeId) -> Option<Llr> {
        self.position(from).map(|pos| self.inbox[pos])
    }

    fn position(&self, id: NodeId) -> Option<usize> {
        self.neighbors.iter().position(|n| n.id == id)
    }

    /// Adds a neighbour with a zero message slot. Registering the same id again
    /// only updates its arena index.
    pub(crate) fn register_neighbor(&mut self, neighbor: Neighbor) {
        match self.position(neighbor.id) {
            Some(pos) => self.neighbors[pos] = neighbor,
            None => {
                self.neighbors.push(neighbor);
                self.inbox.push(0.0);
            }
        }
    }

    /// Drop every neighbour together with its message slot
    pub(crate) fn detach(&mut self) {
        self.neighbors.clear();
        self.inbox.clear();
    }

    /// Overwrite all inbound messages, in neighbour order
    pub(crate) fn store_messages(&mut self, messages: &[Llr]) {
        self.inbox.copy_from_slice(messages);
    }

    /// Reset per-attempt state. Variable nodes given a symbol take a new channel
    /// observation; `None` keeps the previous one. Check nodes ignore the symbol.
    /// All inbound messages are zeroed.
    pub fn initialize(&mut self, symbol: Option<u8>) {
        if let (NodeKind::Variable(v), Some(symbol)) = (&mut self.kind, symbol) {
            v.symbol = Some(symbol);
            v.channel_llr = v.channel.llr(symbol);
        }
        self.inbox.clear();
        self.inbox.resize(self.neighbors.len(), 0.0);
    }

    /// Stored messages from every neighbour except `requester`
    fn extrinsic(&self, requester: NodeId) -> impl Iterator<Item = Llr> + '_ {
        self.neighbors
            .iter()
            .zip(self.inbox.iter())
            .filter(move |(n, _)| n.id != requester)
            .map(|(_, &m)| m)
    }

    /// Outgoing message to `requester`, excluding what `requester` itself sent
    pub fn message(&self, requester: NodeId) -> Llr {
        match &self.kind {
            NodeKind::Check => check_rule(self.extrinsic(requester)),
            NodeKind::Variable(v) => v.channel_llr + self.extrinsic(requester).sum::<Llr>(),
        }
    }

    /// Total belief of a variable node: channel LLR plus every stored message.
    /// None for check nodes.
    pub fn estimate(&self) -> Option<Llr> {
        match &self.kind {
            NodeKind::Check => None,
            NodeKind::Variable(v) => Some(v.channel_llr + self.inbox.iter().sum::<Llr>()),
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// Equality, hashing and ordering follow the ordering key, not the id
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.order.hash(state);
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> Ordering {
        self.order.cmp(&other.order)
    }
}
