use std::path::PathBuf;
use std::str::FromStr;

use qlad_capture::{CaptureConfig, CaptureInput, FILTER_QUERIES, FILTER_REPLIES};
use qlad_core::AnalysedParameter;

use crate::cli::CliArgs;
use crate::error::{Error, Result};

/// Which traffic dimension identifies a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    SrcIp,
    DstIp,
    QName,
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "srcIP" => Ok(Self::SrcIp),
            "dstIP" => Ok(Self::DstIp),
            "qname" => Ok(Self::QName),
            other => Err(format!("unknown policy '{other}' (expected srcIP|dstIP|qname)")),
        }
    }
}

/// The fully validated configuration threaded into the controller, built
/// from raw [`CliArgs`] against the bounds in the CLI surface.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub window_size: u64,
    pub detection_interval: u64,
    pub detection_threshold: f64,
    pub sketch_count: usize,
    pub hash_count: usize,
    pub aggregation_count: usize,
    pub thread_count: usize,
    pub analysed_parameter: AnalysedParameter,
    pub policy: PolicyKind,
    pub capture: CaptureConfig,
    pub anomalies_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_cli(args: CliArgs) -> Result<Self> {
        if args.window_size < 5 {
            return Err(Error::Config("--window-size must be at least 5".into()));
        }
        if args.detection_interval < 1 {
            return Err(Error::Config("--detection-interval must be at least 1".into()));
        }
        if args.detection_interval > args.window_size {
            return Err(Error::Config(
                "--detection-interval must not exceed --window-size".into(),
            ));
        }
        if args.detection_threshold < 0.0 {
            return Err(Error::Config("--detection-threshold must be >= 0".into()));
        }
        if args.sketch_count < 1 {
            return Err(Error::Config("--sketch-count must be at least 1".into()));
        }
        if args.hash_count < 1 {
            return Err(Error::Config("--hash-count must be at least 1".into()));
        }
        if !(1..=31).contains(&args.aggregation_count) {
            return Err(Error::Config(
                "--aggregation-count must be between 1 and 31".into(),
            ));
        }
        if args.filter_queries && args.filter_replies {
            return Err(Error::Config(
                "--filter-queries and --filter-replies are mutually exclusive".into(),
            ));
        }

        let thread_count = match args.thread_count {
            Some(0) => return Err(Error::Config("--thread-count must be at least 1".into())),
            Some(n) => n as usize,
            None => std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        };

        let analysed_parameter = AnalysedParameter::from_str(&args.analysed_gamma_parameter)
            .map_err(Error::Config)?;
        let policy = PolicyKind::from_str(&args.policy).map_err(Error::Config)?;

        if args.graph_anomalies.is_some() {
            tracing::info!("--graph-anomalies accepted but plotting is not implemented; no plot files will be written");
        }

        let filter = if args.filter_queries {
            Some(FILTER_QUERIES.to_string())
        } else if args.filter_replies {
            Some(FILTER_REPLIES.to_string())
        } else {
            None
        };

        Ok(Self {
            window_size: args.window_size,
            detection_interval: args.detection_interval,
            detection_threshold: args.detection_threshold,
            sketch_count: args.sketch_count as usize,
            hash_count: args.hash_count as usize,
            aggregation_count: args.aggregation_count as usize,
            thread_count,
            analysed_parameter,
            policy,
            capture: CaptureConfig {
                input: CaptureInput::from_cli_value(&args.input_file),
                filter,
                snaplen: 65535,
                promiscuous: false,
            },
            anomalies_dir: args.graph_anomalies,
        })
    }
}
