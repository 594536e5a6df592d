mod cli;
mod config;
mod error;
mod report;

use clap::Parser;
use qlad_capture::{PacketSource, PcapPacketSource};
use qlad_core::Policy;
use qlad_engine::{EngineConfig, SlidingController};
use qlad_policy::{DstIpPolicy, QNamePolicy, SrcIpPolicy};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::CliArgs;
use crate::config::{AppConfig, PolicyKind};
use crate::error::Error;

fn main() {
    let args = CliArgs::parse();
    init_logging(args.verbose);

    if let Err(err) = run(args) {
        tracing::error!("{err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_directive = match verbose {
        0 => "qlad=info",
        1 => "qlad=debug",
        _ => "qlad=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
}

fn run(args: CliArgs) -> Result<(), Error> {
    let config = AppConfig::from_cli(args)?;

    let mut source = PcapPacketSource::default();
    source.open(&config.capture)?;

    let engine_config = EngineConfig {
        sketch_count: config.sketch_count,
        aggregation_count: config.aggregation_count,
        threshold: config.detection_threshold,
        analysed_parameter: config.analysed_parameter,
    };

    match config.policy {
        PolicyKind::SrcIp => run_with_policy::<SrcIpPolicy>(&config, engine_config, source),
        PolicyKind::DstIp => run_with_policy::<DstIpPolicy>(&config, engine_config, source),
        PolicyKind::QName => run_with_policy::<QNamePolicy>(&config, engine_config, source),
    }
}

fn run_with_policy<P: Policy>(
    config: &AppConfig,
    engine_config: EngineConfig,
    source: PcapPacketSource,
) -> Result<(), Error> {
    let controller: SlidingController<P, PcapPacketSource> = SlidingController::new(
        config.window_size,
        config.detection_interval,
        config.hash_count,
        engine_config,
        config.thread_count,
        source,
    );

    controller.run(|result| report::print_report(&result))?;
    Ok(())
}
