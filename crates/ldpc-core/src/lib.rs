//! Core utilities for LDPC belief-propagation decoding
//!
//! This crate provides fundamental types shared across the workspace:
//! - ParityCheckMatrix, a dense binary H with syndrome computation
//! - Side, the bipartition tag of Tanner graph nodes
//! - LdpcErr, the common error type
//! - Bitstring helpers and logging setup

pub mod bits;
pub mod debug;
pub mod error;
pub mod matrix;
pub mod side;

// Re-export commonly used items
pub use error::LdpcErr;
pub use matrix::ParityCheckMatrix;
pub use side::Side;

/// Log-likelihood ratio, log(P(bit = 0) / P(bit = 1)). Negative favours a 1.
pub type Llr = f64;

/// Hard-decide a single LLR. Ties (exactly zero) decide 0.
#[inline]
pub fn hard_decision(llr: Llr) -> u8 {
    if llr < 0.0 { 1 } else { 0 }
}
