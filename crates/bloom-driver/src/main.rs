//! bloom-demo: fill a Bloom filter from a word list and compare the projected
//! false positive rate with the observed one.
//!
//! ## Usage
//!
//! ```bash
//! # 100k words, 4 hashes, 5% target
//! bloom-demo --words wordlist.txt
//!
//! # Custom sizing, JSON output
//! bloom-demo --words wordlist.txt --keys 50000 --hashes 6 --fpr 0.01 --json
//!
//! # Sizing from a config file
//! bloom-demo --words wordlist.txt --config bloom.json
//! ```
//!
//! Set `RUST_LOG=debug` for allocation and progress logs.

use std::path::PathBuf;

use anyhow::Result;
use bloom_core::{BloomConfigBuilder, HashKind};
use bloom_driver::{load_config, run_demo_from_path, DemoOptions};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Bloom filter demonstration driver
#[derive(Parser, Debug)]
#[command(name = "bloom-demo")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Line-delimited word list
    #[arg(long)]
    words: PathBuf,

    /// Number of keys to insert (key capacity)
    #[arg(long, default_value = "100000")]
    keys: usize,

    /// Indices derived per key
    #[arg(long, default_value = "4")]
    hashes: usize,

    /// Target false positive rate
    #[arg(long, default_value = "0.05")]
    fpr: f64,

    /// Hash primitive: sip or murmur
    #[arg(long, default_value = "sip")]
    hasher: HashKind,

    /// JSON BloomConfig; overrides --keys, --hashes and --fpr
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => BloomConfigBuilder::new()
            .key_capacity(args.keys)
            .hash_count(args.hashes)
            .target_fpr(args.fpr)
            .build()?,
    };

    info!(
        words = %args.words.display(),
        key_capacity = config.key_capacity,
        hash_count = config.hash_count,
        target_fpr = config.target_fpr,
        "Starting bloom filter demo"
    );

    let options = DemoOptions {
        config,
        hasher: args.hasher,
    };
    let report = run_demo_from_path(&args.words, &options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    Ok(())
}
