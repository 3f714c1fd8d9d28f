//! Belief-propagation (sum-product) decoding of LDPC codes on Tanner graphs
//!
//! - `node`: variable and check nodes with the LLR-domain message rules
//! - `graph`: the Tanner graph arena, built from H or edge by edge
//! - `decoder`: the flooding-schedule decode loop with syndrome-based stopping
//! - `channel`: channel models turning received symbols into LLRs
//! - `export`: plain node/edge view for external tools

pub mod channel;
pub mod decoder;
pub mod export;
pub mod graph;
pub mod node;

pub use channel::{Bsc, ChannelModel};
pub use decoder::{BeliefPropagationDecoder, DecodeResult, DecodeStatus};
pub use export::GraphExport;
pub use graph::TannerGraph;
pub use node::{Node, NodeId, NodeKind, VariableNode};
