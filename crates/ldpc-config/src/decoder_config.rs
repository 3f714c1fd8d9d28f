use serde::Deserialize;
use ldpc_core::ParityCheckMatrix;

/// Channel model used to turn received symbols into LLRs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ChannelKind {
    /// Binary symmetric channel
    Bsc,
}

#[derive(Debug, Clone)]
pub struct CfgChannel {
    pub model: ChannelKind,
    /// Bit flip probability p of the BSC, 0 < p < 1
    pub crossover_probability: f64,
}

#[derive(Debug, Clone)]
pub struct CfgCode {
    /// M x N, one row per check node and one column per code bit
    pub parity_check: ParityCheckMatrix,
}

#[derive(Debug, Clone)]
pub struct CfgDecoder {
    /// Iteration budget per decode call
    pub max_iter: usize,
}

impl Default for CfgDecoder {
    fn default() -> Self {
        Self { max_iter: default_max_iter() }
    }
}

#[inline]
pub(crate) fn default_max_iter() -> usize {
    10
}

#[derive(Debug, Clone)]
pub struct DecoderConfig {
    pub debug_log: Option<String>,
    pub code: CfgCode,
    pub channel: CfgChannel,
    pub decoder: CfgDecoder,
}

impl DecoderConfig {
    pub fn new(parity_check: ParityCheckMatrix, crossover_probability: f64) -> Self {
        DecoderConfig {
            debug_log: None,
            code: CfgCode { parity_check },
            channel: CfgChannel { model: ChannelKind::Bsc, crossover_probability },
            decoder: CfgDecoder::default(),
        }
    }

    /// Validate that all configuration fields hold usable values.
    pub fn validate(&self) -> Result<(), &str> {
        match self.channel.model {
            ChannelKind::Bsc => {
                let p = self.channel.crossover_probability;
                if !(p > 0.0 && p < 1.0) {
                    return Err("channel crossover_probability must lie strictly between 0 and 1");
                }
            }
        }

        let h = &self.code.parity_check;
        if h.num_rows() == 0 || h.num_cols() == 0 {
            return Err("code parity_check must have at least one row and one column");
        }
        if h.num_ones() == 0 {
            return Err("code parity_check has no nonzero entries");
        }

        Ok(())
    }

    /// Block length N
    pub fn block_len(&self) -> usize {
        self.code.parity_check.num_cols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        let h = ParityCheckMatrix::from_bitstrs(&["110", "011"]).unwrap();
        let mut cfg = DecoderConfig::new(h, 0.1);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.block_len(), 3);
        assert_eq!(cfg.decoder.max_iter, 10);

        cfg.channel.crossover_probability = 0.0;
        assert!(cfg.validate().is_err());
        cfg.channel.crossover_probability = 1.0;
        assert!(cfg.validate().is_err());
        cfg.channel.crossover_probability = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_empty_code() {
        let h = ParityCheckMatrix::zeros(2, 3);
        let cfg = DecoderConfig::new(h, 0.1);
        assert!(cfg.validate().is_err());
    }
}
