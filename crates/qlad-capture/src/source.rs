use qlad_core::{FlowStore, Policy};

use crate::config::CaptureConfig;
use crate::error::Result;

/// A source of `(timestamp, IP-layer payload)` records, fed directly into a
/// [`FlowStore`] a fixed number of seconds at a time.
///
/// Implemented by [`crate::pcap_source::PcapPacketSource`] (live interfaces
/// and offline capture files) and, for tests, [`crate::vec_source::VecPacketSource`].
pub trait PacketSource {
    /// Opens the source per `config`: resolves the input, applies the BPF
    /// filter if any, and determines the link-layer header to strip.
    fn open(&mut self, config: &CaptureConfig) -> Result<()>;

    /// Whether further packets may still be available (false once the
    /// source is exhausted, e.g. end of an offline capture file).
    fn can_capture(&self) -> bool;

    /// Delivers packets to `store` for up to `interval_seconds` of
    /// packet-timestamp time (not wall-clock time), or until the source is
    /// exhausted or [`PacketSource::stop_capture`] is called. Each payload
    /// handed to `store.add_packet` starts at the IP header; the
    /// link-layer header is already stripped.
    fn start_capture<P: Policy>(
        &mut self,
        store: &mut FlowStore<P>,
        interval_seconds: u64,
    ) -> Result<()>;

    /// Requests that the current or next `start_capture` call return as
    /// soon as possible. Safe to call from another thread.
    fn stop_capture(&self);

    /// Releases any resources held by the source.
    fn close(&mut self);
}
