//! Channel models mapping a received symbol to its initial LLR.
//!
//! Sign convention: LLR = log(P(bit = 0 | y) / P(bit = 1 | y)), so a negative
//! value means a transmitted 1 is more likely.

use std::sync::Arc;

use ldpc_config::{CfgChannel, ChannelKind};
use ldpc_core::{LdpcErr, Llr, assert_warn};

/// Pure function from a received hard symbol (0 or 1) to an LLR.
/// Any `Fn(u8) -> f64` closure is a channel model.
pub trait ChannelModel: Send + Sync {
    fn llr(&self, symbol: u8) -> Llr;

    /// Short description for logs
    fn describe(&self) -> String {
        "custom".to_string()
    }
}

impl<F> ChannelModel for F
where
    F: Fn(u8) -> Llr + Send + Sync,
{
    fn llr(&self, symbol: u8) -> Llr {
        self(symbol)
    }
}

/// Binary symmetric channel with crossover probability p:
/// llr(y) = (-1)^y * log((1 - p) / p)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bsc {
    p: f64,
    /// log((1 - p) / p), cached
    magnitude: Llr,
}

impl Bsc {
    pub fn new(p: f64) -> Result<Self, LdpcErr> {
        if !(p > 0.0 && p < 1.0) {
            return Err(LdpcErr::InvalidChannel {
                reason: format!("BSC crossover probability {} not in (0, 1)", p),
            });
        }
        assert_warn!(p != 0.5, "BSC with p = 0.5 carries no information, all channel LLRs are 0");
        Ok(Self { p, magnitude: ((1.0 - p) / p).ln() })
    }

    pub fn crossover_probability(&self) -> f64 {
        self.p
    }
}

impl ChannelModel for Bsc {
    fn llr(&self, symbol: u8) -> Llr {
        if symbol % 2 == 0 { self.magnitude } else { -self.magnitude }
    }

    fn describe(&self) -> String {
        format!("BSC(p={})", self.p)
    }
}

/// Build the channel model selected in the configuration
pub fn from_config(cfg: &CfgChannel) -> Result<Arc<dyn ChannelModel>, LdpcErr> {
    match cfg.model {
        ChannelKind::Bsc => Ok(Arc::new(Bsc::new(cfg.crossover_probability)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bsc_llr() {
        let bsc = Bsc::new(0.1).unwrap();
        let expected = (0.9f64 / 0.1).ln();
        assert!((bsc.llr(0) - expected).abs() < 1e-12);
        assert!((bsc.llr(1) + expected).abs() < 1e-12);
        assert!(bsc.llr(1) < 0.0);
        assert_eq!(bsc.describe(), "BSC(p=0.1)");
    }

    #[test]
    fn test_bsc_rejects_bad_p() {
        assert!(Bsc::new(0.0).is_err());
        assert!(Bsc::new(1.0).is_err());
        assert!(Bsc::new(-0.2).is_err());
        assert!(Bsc::new(f64::NAN).is_err());
    }

    #[test]
    fn test_closure_model() {
        let model = |y: u8| -> f64 { if y == 0 { 2.5 } else { -2.5 } };
        assert_eq!(ChannelModel::llr(&model, 1), -2.5);
        assert_eq!(model.describe(), "custom");
    }

    #[test]
    fn test_from_config() {
        let cfg = CfgChannel { model: ChannelKind::Bsc, crossover_probability: 0.2 };
        let model = from_config(&cfg).unwrap();
        assert!((model.llr(0) - 4f64.ln()).abs() < 1e-12);
    }
}
