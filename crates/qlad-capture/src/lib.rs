//! Packet capture: the [`PacketSource`] contract, a `libpcap`-backed
//! implementation over live interfaces and offline capture files, and an
//! in-memory test double.

mod config;
mod error;
mod pcap_source;
mod source;
mod vec_source;

pub use config::{CaptureConfig, CaptureInput, FILTER_QUERIES, FILTER_REPLIES};
pub use error::{Error, Result};
pub use pcap_source::PcapPacketSource;
pub use source::PacketSource;
pub use vec_source::VecPacketSource;
