//! # Bloom Demo Driver
//!
//! Orchestration around `bloom-core`:
//!
//! 1. Insert the first N keys of a word list
//! 2. Re-query those N keys and count misses (must be zero)
//! 3. Query the next N keys, none of which were inserted, and count hits
//! 4. Report the projected rate next to the observed one

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use bloom_core::{BloomConfig, BloomFilter, FilterError, HashKind, Metrics, MetricsSnapshot};
use serde::Serialize;
use tracing::{info, warn};

/// What to build and how to hash.
#[derive(Clone, Debug, Default)]
pub struct DemoOptions {
    pub config: BloomConfig,
    pub hasher: HashKind,
}

/// Outcome of one demonstration run
#[derive(Clone, Debug, Serialize)]
pub struct DemoReport {
    pub hasher: String,
    pub key_capacity: usize,
    pub hash_count: usize,
    pub target_fpr: f64,
    pub bit_length: usize,
    pub keys_inserted: usize,
    pub set_bit_count: usize,
    /// Rate projected from the set bits after all inserts
    pub projected_fpr: f64,
    /// Inserted keys that `find` rejected
    pub missing: usize,
    /// Never-inserted keys queried
    pub probes: usize,
    pub false_positives: usize,
    pub empirical_fpr: f64,
    pub metrics: MetricsSnapshot,
}

impl fmt::Display for DemoReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Filter: n={} d={} P={} hasher={}",
            self.key_capacity, self.hash_count, self.target_fpr, self.hasher
        )?;
        writeln!(
            f,
            "Bits: {} allocated, {} set",
            self.bit_length, self.set_bit_count
        )?;
        writeln!(f, "Estimated False Positive: {}", self.projected_fpr)?;
        writeln!(f, "Missing {} words", self.missing)?;
        write!(
            f,
            "Percent False Positive: {} ({} of {})",
            self.empirical_fpr, self.false_positives, self.probes
        )
    }
}

/// Read up to `limit` trimmed lines from `path`.
pub fn load_keys(path: &Path, limit: usize) -> Result<Vec<String>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open word list {}", path.display()))?;

    BufReader::new(file)
        .lines()
        .take(limit)
        .map(|line| {
            line.map(|l| l.trim().to_string())
                .with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect()
}

/// Load a `BloomConfig` from a JSON file.
pub fn load_config(path: &Path) -> Result<BloomConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: BloomConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid config JSON in {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Run the demonstration over `keys`.
///
/// The first `key_capacity` keys are inserted; the rest (up to another
/// `key_capacity`) are used as never-inserted probes.
pub fn run_demo(keys: &[String], options: &DemoOptions) -> Result<DemoReport, FilterError> {
    let config = &options.config;
    let metrics = Metrics::new();

    let mut filter = BloomFilter::from_config_with_hasher(config, options.hasher)?;
    metrics.record_filter_created(filter.bit_length(), filter.hash_count(), filter.key_capacity());

    let split = config.key_capacity.min(keys.len());
    let (inserted, rest) = keys.split_at(split);
    let probes = &rest[..rest.len().min(config.key_capacity)];

    if inserted.len() < config.key_capacity {
        warn!(
            available = inserted.len(),
            wanted = config.key_capacity,
            "Word list shorter than key capacity"
        );
    }

    for key in inserted {
        let before = filter.set_bit_count();
        let start = Instant::now();
        filter.insert(key);
        metrics.record_insert(start.elapsed(), filter.set_bit_count() - before);
    }

    let projected_fpr = filter.false_positive_rate();
    info!(
        keys = inserted.len(),
        set_bits = filter.set_bit_count(),
        projected_fpr,
        "Inserted keys"
    );

    let missing = inserted.iter().filter(|key| !filter.find(key)).count();
    if missing > 0 {
        warn!(missing, "Inserted keys reported absent");
    }

    // Only never-inserted probes feed the lookup counters
    for key in probes {
        let start = Instant::now();
        let found = filter.find(key);
        metrics.record_lookup(start.elapsed(), found);
    }

    let snapshot = metrics.snapshot();
    let report = DemoReport {
        hasher: format!("{:?}", options.hasher).to_lowercase(),
        key_capacity: filter.key_capacity(),
        hash_count: filter.hash_count(),
        target_fpr: filter.target_fpr(),
        bit_length: filter.bit_length(),
        keys_inserted: inserted.len(),
        set_bit_count: filter.set_bit_count(),
        projected_fpr,
        missing,
        probes: probes.len(),
        false_positives: snapshot.lookups_positive as usize,
        empirical_fpr: metrics.observed_positive_rate(),
        metrics: snapshot,
    };

    info!(
        empirical_fpr = report.empirical_fpr,
        probes = report.probes,
        "Probed never-inserted keys"
    );

    Ok(report)
}

/// Load keys from `path` and run the demonstration.
pub fn run_demo_from_path(path: &Path, options: &DemoOptions) -> Result<DemoReport> {
    let limit = options.config.key_capacity.saturating_mul(2);
    let keys = load_keys(path, limit)?;
    let report = run_demo(&keys, options).context("Failed to build filter")?;
    Ok(report)
}
