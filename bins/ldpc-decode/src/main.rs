use clap::Parser;

use ldpc_bp::{BeliefPropagationDecoder, DecodeResult};
use ldpc_config::{DecoderConfig, toml_config};
use ldpc_core::{bits, debug};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "LDPC belief-propagation decoder",
    long_about = "Decodes received hard-decision words with sum-product belief propagation on the Tanner graph of the configured parity-check matrix"
)]
struct Args {
    /// Config file (required)
    #[arg(help = "TOML configuration file with the parity-check matrix, channel and decoder settings")]
    config: String,

    /// Received words to decode
    #[arg(help = "Received words as bitstrings, e.g. 1100100001")]
    words: Vec<String>,

    #[arg(long = "json", help = "Print the Tanner graph as JSON nodes and edges")]
    json: bool,
}

/// Load configuration file
fn load_config_from_toml(cfg_path: &str) -> DecoderConfig {
    match toml_config::from_file(cfg_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", cfg_path, e);
            std::process::exit(1);
        }
    }
}

fn print_result(word: &str, res: &DecodeResult) {
    println!("received   {}", word);
    println!("estimate   {}", bits::to_bitstr(&res.estimate));
    println!("syndrome   {}", bits::to_bitstr(&res.syndrome));
    let llrs: Vec<String> = res.llr.iter().map(|l| format!("{:.3}", l)).collect();
    println!("llr        [{}]", llrs.join(", "));
    println!("status     {:?} after {} iterations", res.status(), res.iterations);
}

fn main() {
    eprintln!("[+] LDPC belief-propagation decoder");

    let args = Args::parse();
    let cfg = load_config_from_toml(&args.config);
    let _log_guard = match debug::setup_logging_default(cfg.debug_log.clone()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: failed to open log file: {}", e);
            std::process::exit(1);
        }
    };

    let mut decoder = match BeliefPropagationDecoder::from_config(&cfg) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: failed to build decoder: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        "{} with {} parity checks, max_iter={}",
        decoder.graph(),
        decoder.parity_check().num_rows(),
        decoder.max_iter()
    );

    if args.json {
        match decoder.graph().export().to_json() {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error: failed to serialize graph: {}", e);
                std::process::exit(1);
            }
        }
    }

    if args.words.is_empty() && !args.json {
        eprintln!("Error: no words to decode");
        std::process::exit(1);
    }

    let mut failed = false;
    for word in &args.words {
        let parsed = match bits::parse_bitstr(word) {
            Ok(w) => w,
            Err(e) => {
                eprintln!("Error: bad word '{}': {}", word, e);
                failed = true;
                continue;
            }
        };
        match decoder.decode(&parsed) {
            Ok(res) => print_result(word, &res),
            Err(e) => {
                eprintln!("Error: decoding '{}' failed: {}", word, e);
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
}
