use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ldpc_core::ParityCheckMatrix;
use serde::Deserialize;
use toml::Value;

use super::decoder_config::{CfgChannel, CfgCode, CfgDecoder, ChannelKind, DecoderConfig};

/// Build `DecoderConfig` from a TOML configuration string
pub fn from_toml_str(toml_str: &str) -> Result<DecoderConfig, Box<dyn std::error::Error>> {
    let root: TomlConfigRoot = toml::from_str(toml_str)?;

    // Various sanity checks
    let expected_config_version = "0.1";
    if !root.config_version.eq(expected_config_version) {
        return Err(format!(
            "Unrecognized config_version: {}, expect {}",
            root.config_version, expected_config_version
        )
        .into());
    }
    if !root.extra.is_empty() {
        return Err(format!("Unrecognized top-level fields: {:?}", sorted_keys(&root.extra)).into());
    }
    if !root.code.extra.is_empty() {
        return Err(format!("Unrecognized fields in code: {:?}", sorted_keys(&root.code.extra)).into());
    }
    if !root.channel.extra.is_empty() {
        return Err(format!("Unrecognized fields in channel: {:?}", sorted_keys(&root.channel.extra)).into());
    }
    if let Some(ref dec) = root.decoder {
        if !dec.extra.is_empty() {
            return Err(format!("Unrecognized fields in decoder: {:?}", sorted_keys(&dec.extra)).into());
        }
    }

    let parity_check = ParityCheckMatrix::from_bitstrs(&root.code.parity_check)?;

    let mut cfg = DecoderConfig {
        debug_log: root.debug_log,
        code: CfgCode { parity_check },
        channel: CfgChannel {
            model: root.channel.model,
            crossover_probability: root.channel.crossover_probability,
        },
        decoder: CfgDecoder::default(),
    };

    if let Some(dec) = root.decoder {
        apply_decoder_patch(&mut cfg.decoder, dec);
    }

    cfg.validate().map_err(|e| format!("Invalid decoder configuration: {}", e))?;
    tracing::debug!(
        "loaded {}x{} code, {:?} p={}, max_iter={}",
        cfg.code.parity_check.num_rows(),
        cfg.code.parity_check.num_cols(),
        cfg.channel.model,
        cfg.channel.crossover_probability,
        cfg.decoder.max_iter
    );

    Ok(cfg)
}

/// Build `DecoderConfig` from any reader.
pub fn from_reader<R: Read>(reader: R) -> Result<DecoderConfig, Box<dyn std::error::Error>> {
    let mut contents = String::new();
    let mut reader = BufReader::new(reader);
    reader.read_to_string(&mut contents)?;
    from_toml_str(&contents)
}

/// Build `DecoderConfig` from a file path.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<DecoderConfig, Box<dyn std::error::Error>> {
    let f = File::open(path)?;
    let r = BufReader::new(f);
    let cfg = from_reader(r)?;
    Ok(cfg)
}

fn apply_decoder_patch(dst: &mut CfgDecoder, src: DecoderDto) {
    if let Some(v) = src.max_iter {
        dst.max_iter = v;
    }
}

fn sorted_keys(map: &HashMap<String, Value>) -> Vec<&str> {
    let mut v: Vec<&str> = map.keys().map(|s| s.as_str()).collect();
    v.sort_unstable();
    v
}

/// ----------------------- DTOs for input shape -----------------------

#[derive(Deserialize)]
struct TomlConfigRoot {
    config_version: String,
    debug_log: Option<String>,

    code: CodeDto,

    channel: ChannelDto,

    #[serde(default)]
    decoder: Option<DecoderDto>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct CodeDto {
    parity_check: Vec<String>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct ChannelDto {
    model: ChannelKind,
    crossover_probability: f64,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[derive(Default, Deserialize)]
struct DecoderDto {
    max_iter: Option<usize>,

    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder_config::default_max_iter;

    const EXAMPLE: &str = r#"
config_version = "0.1"

[code]
parity_check = [
    "1111000000",
    "1000111000",
    "0100100110",
    "0010010101",
    "0001001011",
]

[channel]
model = "Bsc"
crossover_probability = 0.1

[decoder]
max_iter = 25
"#;

    #[test]
    fn test_parse_example() {
        let cfg = from_toml_str(EXAMPLE).unwrap();
        assert_eq!(cfg.code.parity_check.num_rows(), 5);
        assert_eq!(cfg.block_len(), 10);
        assert_eq!(cfg.channel.model, ChannelKind::Bsc);
        assert_eq!(cfg.channel.crossover_probability, 0.1);
        assert_eq!(cfg.decoder.max_iter, 25);
        assert!(cfg.debug_log.is_none());
    }

    #[test]
    fn test_default_max_iter() {
        let toml = EXAMPLE.replace("[decoder]\nmax_iter = 25\n", "");
        let cfg = from_toml_str(&toml).unwrap();
        assert_eq!(cfg.decoder.max_iter, default_max_iter());
    }

    #[test]
    fn test_reject_unknown_fields() {
        let toml = EXAMPLE.replace("max_iter = 25", "max_iter = 25\nschedule = \"layered\"");
        let err = from_toml_str(&toml).unwrap_err();
        assert!(err.to_string().contains("schedule"));

        let toml = format!("stray = 1\n{}", EXAMPLE);
        assert!(from_toml_str(&toml).is_err());
    }

    #[test]
    fn test_reject_bad_version_and_values() {
        let toml = EXAMPLE.replace("\"0.1\"", "\"0.0\"");
        assert!(from_toml_str(&toml).is_err());

        let toml = EXAMPLE.replace("0.1\n\n[decoder]", "1.5\n\n[decoder]");
        let err = from_toml_str(&toml).unwrap_err();
        assert!(err.to_string().contains("crossover_probability"));

        let toml = EXAMPLE.replace("\"0001001011\"", "\"000100101\"");
        assert!(from_toml_str(&toml).is_err());
    }
}
