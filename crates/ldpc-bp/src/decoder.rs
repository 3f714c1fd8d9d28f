//! Sum-product decoder with a flooding schedule.
//!
//! A decode call moves through Initialized -> Iterating -> Converged | Exhausted.
//! Each round is a full check-to-variable half round followed by a full
//! variable-to-check half round, then a hard decision and syndrome check.
//! Exhausting the iteration budget is a normal outcome, not an error.

use ldpc_config::DecoderConfig;
use ldpc_core::{
    LdpcErr, Llr, ParityCheckMatrix, Side, assert_warn, bits, expect_len, expect_shape, hard_decision,
};

use crate::channel;
use crate::graph::TannerGraph;
use crate::node::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// All-zero syndrome reached
    Converged,
    /// Iteration budget used up without a valid codeword
    Exhausted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodeResult {
    /// Hard decisions in code bit order
    pub estimate: Vec<u8>,
    /// Total beliefs behind `estimate`
    pub llr: Vec<Llr>,
    /// (H . estimate) mod 2, from the same round as `estimate`
    pub syndrome: Vec<u8>,
    pub converged: bool,
    /// Rounds run, 0 if the budget was 0
    pub iterations: usize,
}

impl DecodeResult {
    pub fn status(&self) -> DecodeStatus {
        if self.converged { DecodeStatus::Converged } else { DecodeStatus::Exhausted }
    }
}

pub struct BeliefPropagationDecoder {
    graph: TannerGraph,
    h: ParityCheckMatrix,
    /// Block length N
    n: usize,
    max_iter: usize,
    /// Variable node ids sorted by ordering key, i.e. bit i of the word
    bit_order: Vec<NodeId>,
}

impl BeliefPropagationDecoder {
    /// The matrix must have one row per check node and one column per variable
    /// node, and its 1-entries must be exactly the graph's edges when rows and
    /// columns are taken in ordering key order.
    pub fn new(graph: TannerGraph, h: ParityCheckMatrix, max_iter: usize) -> Result<Self, LdpcErr> {
        expect_shape!(h.num_cols(), graph.num_variable_nodes(), "parity-check columns vs variable nodes")?;
        expect_shape!(h.num_rows(), graph.num_check_nodes(), "parity-check rows vs check nodes")?;
        if graph.to_parity_check_matrix() != h {
            return Err(LdpcErr::InvalidMatrix {
                reason: "1-entries do not match the graph's edges".to_string(),
            });
        }

        for c in graph.check_nodes() {
            assert_warn!(c.degree() > 1, "check node {} has degree {}", c, c.degree());
        }

        let bit_order = graph.ordered_variable_nodes().iter().map(|n| n.id()).collect();
        let n = h.num_cols();
        Ok(Self { graph, h, n, max_iter, bit_order })
    }

    /// Build graph, channel model and decoder from a validated configuration
    pub fn from_config(cfg: &DecoderConfig) -> Result<Self, LdpcErr> {
        let channel = channel::from_config(&cfg.channel)?;
        let h = cfg.code.parity_check.clone();
        let graph = TannerGraph::from_parity_check_matrix(&h, channel);
        Self::new(graph, h, cfg.decoder.max_iter)
    }

    pub fn graph(&self) -> &TannerGraph {
        &self.graph
    }

    pub fn into_graph(self) -> TannerGraph {
        self.graph
    }

    pub fn parity_check(&self) -> &ParityCheckMatrix {
        &self.h
    }

    pub fn block_len(&self) -> usize {
        self.n
    }

    pub fn max_iter(&self) -> usize {
        self.max_iter
    }

    pub fn set_max_iter(&mut self, max_iter: usize) {
        self.max_iter = max_iter;
    }

    /// Decode one received word of hard symbols (0 or 1).
    /// Fails only for malformed input, in which case no node state is touched.
    pub fn decode(&mut self, word: &[u8]) -> Result<DecodeResult, LdpcErr> {
        expect_len!(word.len(), self.n)?;
        if let Some(position) = word.iter().position(|&s| s > 1) {
            return Err(LdpcErr::InvalidSymbol { position, value: word[position] });
        }
        tracing::debug!("decode {} max_iter={}", bits::to_bitstr(word), self.max_iter);

        // Initialized: channel LLRs into the variable nodes, then prime the
        // check nodes with the channel-only variable messages (round 0)
        for (&id, &symbol) in self.bit_order.iter().zip(word) {
            if let Some(node) = self.graph.node_mut(id) {
                node.initialize(Some(symbol));
            }
        }
        self.graph.initialize_check_nodes();
        self.graph.receive_check_messages();

        let mut result = self.evaluate(0)?;

        // Iterating
        for iter in 1..=self.max_iter {
            self.graph.receive_variable_messages();
            self.graph.receive_check_messages();

            result = self.evaluate(iter)?;
            tracing::trace!(
                iter = iter,
                "estimate {} syndrome weight {}",
                bits::to_bitstr(&result.estimate),
                bits::weight(&result.syndrome)
            );
            if result.converged {
                break;
            }
        }

        match result.status() {
            DecodeStatus::Converged => {
                tracing::debug!("converged after {} rounds: {}", result.iterations, bits::to_bitstr(&result.estimate))
            }
            DecodeStatus::Exhausted => tracing::debug!(
                "exhausted {} rounds, syndrome {}",
                result.iterations,
                bits::to_bitstr(&result.syndrome)
            ),
        }
        Ok(result)
    }

    /// Read current beliefs in bit order, hard-decide them and check the syndrome
    fn evaluate(&self, iterations: usize) -> Result<DecodeResult, LdpcErr> {
        let llr = self
            .bit_order
            .iter()
            .map(|&id| {
                self.graph
                    .node(id)
                    .and_then(|n| n.estimate())
                    .ok_or(LdpcErr::UnknownNodeId { side: Side::Variable, id: id.0 })
            })
            .collect::<Result<Vec<Llr>, _>>()?;
        let estimate: Vec<u8> = llr.iter().map(|&l| hard_decision(l)).collect();
        let syndrome = self.h.syndrome(&estimate)?;
        let converged = syndrome.iter().all(|&s| s == 0);
        Ok(DecodeResult { estimate, llr, syndrome, converged, iterations })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::channel::{Bsc, ChannelModel};

    fn decoder_for(rows: &[&str], p: f64, max_iter: usize) -> BeliefPropagationDecoder {
        let h = ParityCheckMatrix::from_bitstrs(rows).unwrap();
        let channel: Arc<dyn ChannelModel> = Arc::new(Bsc::new(p).unwrap());
        let graph = TannerGraph::from_parity_check_matrix(&h, channel);
        BeliefPropagationDecoder::new(graph, h, max_iter).unwrap()
    }

    #[test]
    fn test_shape_mismatch() {
        let h = ParityCheckMatrix::from_bitstrs(&["110", "011"]).unwrap();
        let other = ParityCheckMatrix::from_bitstrs(&["1100", "0110"]).unwrap();
        let graph = TannerGraph::from_parity_check_matrix(&h, Arc::new(Bsc::new(0.1).unwrap()));
        assert!(matches!(
            BeliefPropagationDecoder::new(graph, other, 5),
            Err(LdpcErr::ShapeMismatch { expected: 3, found: 4, .. })
        ));

        let swapped = ParityCheckMatrix::from_bitstrs(&["011", "110"]).unwrap();
        let graph = TannerGraph::from_parity_check_matrix(&h, Arc::new(Bsc::new(0.1).unwrap()));
        assert!(matches!(
            BeliefPropagationDecoder::new(graph, swapped, 5),
            Err(LdpcErr::InvalidMatrix { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_words() {
        let mut dec = decoder_for(&["110", "011"], 0.1, 5);
        assert_eq!(dec.decode(&[0, 1]), Err(LdpcErr::InvalidInput { expected: 3, found: 2 }));
        assert_eq!(dec.decode(&[0, 2, 0]), Err(LdpcErr::InvalidSymbol { position: 1, value: 2 }));
    }

    #[test]
    fn test_exhausted() {
        // Every round leaves the estimate at 0011, which violates both checks
        let mut dec = decoder_for(&["1110", "1101"], 0.1, 5);
        let res = dec.decode(&[0, 0, 1, 1]).unwrap();
        assert!(!res.converged);
        assert_eq!(res.status(), DecodeStatus::Exhausted);
        assert_eq!(res.iterations, 5);
        assert_eq!(res.estimate, vec![0, 0, 1, 1]);
        assert_eq!(res.syndrome, vec![1, 1]);
        assert_eq!(dec.parity_check().syndrome(&res.estimate).unwrap(), res.syndrome);
    }

    #[test]
    fn test_zero_budget_uses_channel_decision() {
        let mut dec = decoder_for(&["110", "011"], 0.1, 0);
        let res = dec.decode(&[1, 1, 1]).unwrap();
        assert_eq!(res.iterations, 0);
        assert_eq!(res.estimate, vec![1, 1, 1]);
        assert!(res.converged);

        let res = dec.decode(&[1, 0, 0]).unwrap();
        assert!(!res.converged);
        assert_eq!(res.syndrome, vec![1, 0]);

        dec.set_max_iter(5);
        assert_eq!(dec.max_iter(), 5);
        let res = dec.decode(&[1, 0, 0]).unwrap();
        assert!(res.iterations >= 1);
    }

    #[test]
    fn test_missing_bit_node_is_an_error() {
        let mut dec = decoder_for(&["110", "011"], 0.1, 5);
        dec.bit_order[1] = NodeId(99);
        assert_eq!(dec.evaluate(0), Err(LdpcErr::UnknownNodeId { side: Side::Variable, id: 99 }));
    }

    #[test]
    fn test_closure_channel() {
        let h = ParityCheckMatrix::from_bitstrs(&["11"]).unwrap();
        let channel: Arc<dyn ChannelModel> = Arc::new(|y: u8| -> f64 { if y == 0 { 0.5 } else { -4.0 } });
        let graph = TannerGraph::from_parity_check_matrix(&h, channel);
        let mut dec = BeliefPropagationDecoder::new(graph, h, 3).unwrap();
        // Strong 1 on bit 1 pulls the weak 0 on bit 0 over to 1
        let res = dec.decode(&[0, 1]).unwrap();
        assert!(res.converged);
        assert_eq!(res.estimate, vec![1, 1]);
        assert_eq!(res.iterations, 1);
    }
}
