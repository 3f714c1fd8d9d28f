#![allow(dead_code)]

use std::sync::Arc;

use ldpc_bp::{BeliefPropagationDecoder, Bsc, ChannelModel, TannerGraph};
use ldpc_core::ParityCheckMatrix;

/// 5 x 10 regular code, every bit in two checks and every check on four bits
pub const EXAMPLE_ROWS: [&str; 5] = [
    "1111000000",
    "1000111000",
    "0100100110",
    "0010010101",
    "0001001011",
];

pub const EXAMPLE_CODEWORD: [u8; 10] = [1, 1, 0, 0, 1, 0, 0, 0, 0, 0];

pub fn example_h() -> ParityCheckMatrix {
    ParityCheckMatrix::from_bitstrs(&EXAMPLE_ROWS).unwrap()
}

pub fn bsc(p: f64) -> Arc<dyn ChannelModel> {
    Arc::new(Bsc::new(p).unwrap())
}

pub fn example_decoder(p: f64, max_iter: usize) -> BeliefPropagationDecoder {
    let h = example_h();
    let graph = TannerGraph::from_parity_check_matrix(&h, bsc(p));
    BeliefPropagationDecoder::new(graph, h, max_iter).unwrap()
}
