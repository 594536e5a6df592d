use std::path::PathBuf;

use clap::Parser;

/// DNS traffic anomaly detector: flags source IPs, destination IPs, or
/// query-name suffixes whose per-second rate over a sliding window
/// deviates from the rest of the population.
#[derive(Parser, Debug)]
#[command(name = "qlad", about = "DNS traffic anomaly detector", long_about = None)]
pub struct CliArgs {
    /// Analysis window W, in seconds (minimum 5).
    #[arg(short = 'w', long = "window-size", default_value_t = 300)]
    pub window_size: u64,

    /// Detection tick period I, in seconds (minimum 1, at most the window size).
    #[arg(short = 'i', long = "detection-interval", default_value_t = 150)]
    pub detection_interval: u64,

    /// Anomaly score threshold tau.
    #[arg(short = 't', long = "detection-threshold", default_value_t = 0.8)]
    pub detection_threshold: f64,

    /// Number of sketches K per engine.
    #[arg(short = 's', long = "sketch-count", default_value_t = 16)]
    pub sketch_count: u32,

    /// Number of hash functions / engines N.
    #[arg(short = 'c', long = "hash-count", default_value_t = 12)]
    pub hash_count: u32,

    /// Number of aggregation levels A (1..=31).
    #[arg(short = 'a', long = "aggregation-count", default_value_t = 8)]
    pub aggregation_count: u32,

    /// Worker pool thread count (defaults to the number of online CPUs).
    #[arg(short = 'T', long = "thread-count")]
    pub thread_count: Option<u32>,

    /// Which Gamma parameter(s) to score against: shape, scale, or both.
    #[arg(short = 'p', long = "analysed-gamma-parameter", default_value = "scale")]
    pub analysed_gamma_parameter: String,

    /// Which traffic dimension to track: srcIP, dstIP, or qname.
    #[arg(short = 'P', long = "policy", default_value = "srcIP")]
    pub policy: String,

    /// Capture source: a file path, a live interface name, or `-` for stdin.
    #[arg(short = 'f', long = "input-file", default_value = "-")]
    pub input_file: String,

    /// Apply the `udp and dst port 53` preset filter.
    #[arg(short = 'q', long = "filter-queries")]
    pub filter_queries: bool,

    /// Apply the `udp and src port 53` preset filter.
    #[arg(short = 'r', long = "filter-replies")]
    pub filter_replies: bool,

    /// Directory for anomaly plots. Accepted for CLI compatibility; no
    /// plot files are produced, a notice is logged instead.
    #[arg(short = 'g', long = "graph-anomalies")]
    pub graph_anomalies: Option<PathBuf>,

    /// Raise log verbosity. Repeatable.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}
