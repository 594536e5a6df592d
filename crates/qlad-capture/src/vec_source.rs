use qlad_core::{FlowStore, Policy, Time};

use crate::config::CaptureConfig;
use crate::error::Result;
use crate::source::PacketSource;

/// An in-memory [`PacketSource`] fed from a fixed list of `(payload,
/// timestamp)` pairs, in timestamp order. Used by tests that need a
/// deterministic capture without libpcap.
pub struct VecPacketSource {
    packets: std::vec::IntoIter<(Vec<u8>, Time)>,
    exhausted: bool,
}

impl VecPacketSource {
    pub fn new(packets: Vec<(Vec<u8>, Time)>) -> Self {
        Self {
            packets: packets.into_iter(),
            exhausted: false,
        }
    }
}

impl PacketSource for VecPacketSource {
    fn open(&mut self, _config: &CaptureConfig) -> Result<()> {
        Ok(())
    }

    fn can_capture(&self) -> bool {
        !self.exhausted
    }

    fn start_capture<P: Policy>(
        &mut self,
        store: &mut FlowStore<P>,
        interval_seconds: u64,
    ) -> Result<()> {
        let mut window_start: Option<Time> = None;
        loop {
            match self.packets.next() {
                Some((payload, ts)) => {
                    store.add_packet(&payload, ts);
                    let start = *window_start.get_or_insert(ts);
                    if ts - start >= interval_seconds as i64 {
                        return Ok(());
                    }
                }
                None => {
                    self.exhausted = true;
                    return Ok(());
                }
            }
        }
    }

    fn stop_capture(&self) {}

    fn close(&mut self) {
        self.exhausted = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlad_core::Identifier;

    struct FirstBytePolicy;
    impl Policy for FirstBytePolicy {
        const NAME: &'static str = "test";
        fn parse(data: &[u8]) -> Option<Identifier> {
            data.first().map(|&b| Identifier::IPv4(b as u32))
        }
        fn hash(index: usize, id: &Identifier) -> u32 {
            let Identifier::IPv4(v) = id else { return 0 };
            v.wrapping_add(index as u32)
        }
    }

    #[test]
    fn delivers_one_interval_worth_of_packets_per_call() {
        let packets = vec![
            (vec![1u8], 0),
            (vec![2u8], 1),
            (vec![3u8], 2),
            (vec![4u8], 5),
        ];
        let mut source = VecPacketSource::new(packets);
        let mut store: FlowStore<FirstBytePolicy> = FlowStore::new(10);

        source.start_capture(&mut store, 2).unwrap();
        assert_eq!(store.len(), 3); // ts 0, 1, 2 consumed (2 - 0 >= 2 stops after ts=2)

        source.start_capture(&mut store, 2).unwrap();
        assert_eq!(store.len(), 4); // remaining packet at ts=5 consumed, then exhausted
        assert!(!source.can_capture());
    }

    #[test]
    fn empty_source_is_immediately_exhausted() {
        let mut source = VecPacketSource::new(vec![]);
        let mut store: FlowStore<FirstBytePolicy> = FlowStore::new(10);
        source.start_capture(&mut store, 5).unwrap();
        assert!(!source.can_capture());
    }
}
