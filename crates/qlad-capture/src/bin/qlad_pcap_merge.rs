//! Concatenates multiple capture files into one, in ascending packet
//! timestamp order. A thin secondary utility around the same `pcap` crate
//! `qlad-capture` uses for analysis.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use pcap::{Capture, Packet, PacketHeader};
use qlad_core::merge::merge_union;

#[derive(Parser)]
#[command(name = "qlad-pcap-merge", about = "Merge capture files by timestamp")]
struct Args {
    /// Capture files to merge, in any order.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output capture file path.
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Clone)]
struct OwnedPacket {
    header: PacketHeader,
    data: Vec<u8>,
}

fn read_all(path: &PathBuf) -> Result<Vec<OwnedPacket>, pcap::Error> {
    let mut capture = Capture::from_file(path)?;
    let mut packets = Vec::new();
    loop {
        match capture.next_packet() {
            Ok(packet) => packets.push(OwnedPacket {
                header: *packet.header,
                data: packet.data.to_vec(),
            }),
            Err(pcap::Error::NoMorePackets) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(packets)
}

fn timestamp_key(p: &OwnedPacket) -> (i64, i64) {
    (p.header.ts.tv_sec as i64, p.header.ts.tv_usec as i64)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let mut per_file = Vec::with_capacity(args.inputs.len());
    for path in &args.inputs {
        match read_all(path) {
            Ok(packets) => per_file.push(packets),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to read capture file");
                return ExitCode::FAILURE;
            }
        }
    }

    let merged = merge_union(&per_file, timestamp_key);
    tracing::info!(count = merged.len(), output = %args.output.display(), "writing merged capture");

    let template = match Capture::from_file(&args.inputs[0]) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!(error = %e, "failed to reopen first input as a linktype template");
            return ExitCode::FAILURE;
        }
    };
    let mut savefile = match template.savefile(&args.output) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!(error = %e, "failed to open output capture file");
            return ExitCode::FAILURE;
        }
    };

    for packet in &merged {
        savefile.write(&Packet {
            header: &packet.header,
            data: &packet.data,
        });
    }

    ExitCode::SUCCESS
}
