use std::sync::atomic::{AtomicBool, Ordering};

use pcap::{Active, Capture, Linktype, Offline};
use qlad_core::{FlowStore, Policy};

use crate::config::{CaptureConfig, CaptureInput};
use crate::error::{Error, Result};
use crate::source::PacketSource;

enum Handle {
    Offline(Capture<Offline>),
    Live(Capture<Active>),
}

impl Handle {
    fn get_datalink(&self) -> Linktype {
        match self {
            Handle::Offline(c) => c.get_datalink(),
            Handle::Live(c) => c.get_datalink(),
        }
    }

    fn apply_filter(&mut self, filter: &str) -> std::result::Result<(), pcap::Error> {
        match self {
            Handle::Offline(c) => c.filter(filter, true),
            Handle::Live(c) => c.filter(filter, true),
        }
    }

    fn next_packet(&mut self) -> std::result::Result<(i64, Vec<u8>), pcap::Error> {
        let packet = match self {
            Handle::Offline(c) => c.next_packet()?,
            Handle::Live(c) => c.next_packet()?,
        };
        Ok((packet.header.ts.tv_sec as i64, packet.data.to_vec()))
    }
}

/// `libpcap`-backed [`PacketSource`]: reads an offline capture file when
/// `input` names a readable file (or is `-`, which libpcap itself reads as
/// standard input), falling back to opening `input` as a live interface
/// name otherwise.
pub struct PcapPacketSource {
    handle: Option<Handle>,
    link_header_len: usize,
    exhausted: bool,
    stop: AtomicBool,
}

impl Default for PcapPacketSource {
    fn default() -> Self {
        Self {
            handle: None,
            link_header_len: 0,
            exhausted: false,
            stop: AtomicBool::new(false),
        }
    }
}

impl PcapPacketSource {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Byte length of the link-layer header for a handful of common datalink
/// types. Unrecognized types are rejected rather than guessed at, since a
/// wrong guess would silently corrupt every downstream parse.
fn link_header_len(linktype: Linktype) -> Result<usize> {
    match linktype.0 {
        0 => Ok(4),        // DLT_NULL (BSD loopback)
        1 => Ok(14),       // DLT_EN10MB
        12 | 101 => Ok(0), // DLT_RAW
        113 => Ok(16),     // DLT_LINUX_SLL
        other => Err(Error::UnsupportedLinkType(other)),
    }
}

impl PacketSource for PcapPacketSource {
    fn open(&mut self, config: &CaptureConfig) -> Result<()> {
        let mut handle = match &config.input {
            CaptureInput::Stdin => {
                Handle::Offline(Capture::from_file("-").map_err(Error::Open)?)
            }
            CaptureInput::Path(path) => match Capture::from_file(path) {
                Ok(offline) => Handle::Offline(offline),
                Err(_) => {
                    let device_name = path.to_string_lossy().into_owned();
                    let inactive = Capture::from_device(device_name.as_str()).map_err(Error::Open)?;
                    let active = inactive
                        .promisc(config.promiscuous)
                        .snaplen(config.snaplen)
                        .open()
                        .map_err(Error::Open)?;
                    Handle::Live(active)
                }
            },
        };

        if let Some(filter) = &config.filter {
            handle.apply_filter(filter).map_err(|source| Error::Filter {
                filter: filter.clone(),
                source,
            })?;
        }

        self.link_header_len = link_header_len(handle.get_datalink())?;
        self.handle = Some(handle);
        self.exhausted = false;
        Ok(())
    }

    fn can_capture(&self) -> bool {
        self.handle.is_some() && !self.exhausted
    }

    fn start_capture<P: Policy>(
        &mut self,
        store: &mut FlowStore<P>,
        interval_seconds: u64,
    ) -> Result<()> {
        self.stop.store(false, Ordering::SeqCst);
        let link_header_len = self.link_header_len;
        let handle = self.handle.as_mut().expect("start_capture called before open");

        let mut window_start: Option<i64> = None;
        loop {
            if self.stop.load(Ordering::SeqCst) {
                return Ok(());
            }
            match handle.next_packet() {
                Ok((ts, data)) => {
                    if data.len() > link_header_len {
                        store.add_packet(&data[link_header_len..], ts);
                    } else {
                        tracing::trace!("packet shorter than the link-layer header; dropped");
                    }
                    let start = *window_start.get_or_insert(ts);
                    if ts - start >= interval_seconds as i64 {
                        return Ok(());
                    }
                }
                Err(pcap::Error::NoMorePackets) => {
                    self.exhausted = true;
                    return Ok(());
                }
                Err(other) => return Err(Error::Read(other)),
            }
        }
    }

    fn stop_capture(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    fn close(&mut self) {
        self.handle = None;
    }
}
