use std::collections::BTreeMap;
use std::marker::PhantomData;

use crate::identifier::Identifier;
use crate::policy::Policy;
use crate::sparse_flow::{SparseFlow, Time};

/// The sliding window: per-identifier [`SparseFlow`]s, bounded to the most
/// recent `window_size` seconds, plus an aggregate `all_traffic` flow.
///
/// Generic over the [`Policy`] used to extract identifiers from packets, so
/// the same code serves the source-IP, destination-IP, and query-name
/// analyses. `Clone` so a detection tick can snapshot the store without
/// blocking the capture thread that keeps writing to it.
#[derive(Clone)]
pub struct FlowStore<P: Policy> {
    window_size: u64,
    start_time: Option<Time>,
    end_time: Option<Time>,
    flows: BTreeMap<Identifier, SparseFlow>,
    all_traffic: SparseFlow,
    _policy: PhantomData<P>,
}

impl<P: Policy> FlowStore<P> {
    pub fn new(window_size: u64) -> Self {
        assert!(window_size >= 1);
        Self {
            window_size,
            start_time: None,
            end_time: None,
            flows: BTreeMap::new(),
            all_traffic: SparseFlow::new(),
            _policy: PhantomData,
        }
    }

    pub fn window_size(&self) -> u64 {
        self.window_size
    }

    pub fn start_time(&self) -> Option<Time> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<Time> {
        self.end_time
    }

    /// Current window span in seconds (`end - start + 1`), or 0 before the
    /// first packet.
    pub fn current_window(&self) -> u64 {
        match (self.start_time, self.end_time) {
            (Some(s), Some(e)) => (e - s + 1) as u64,
            _ => 0,
        }
    }

    /// Number of distinct identifiers currently tracked — the report's
    /// denominator, not the window length.
    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    pub fn all_traffic(&self) -> &SparseFlow {
        &self.all_traffic
    }

    /// Iterates `(identifier, flow)` pairs in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&Identifier, &SparseFlow)> {
        self.flows.iter()
    }

    /// Parses `payload` via `P`, and if it yields a valid identifier,
    /// records one packet at second `t`. Invalid or unparseable payloads,
    /// and out-of-order points, are silently dropped.
    pub fn add_packet(&mut self, payload: &[u8], t: Time) {
        let Some(id) = P::parse(payload) else {
            return;
        };
        if !id.is_valid() {
            return;
        }

        self.end_time = Some(self.end_time.map_or(t, |e| e.max(t)));
        let window_start = self.end_time.unwrap() - self.window_size as i64 + 1;
        self.start_time = Some(self.start_time.map_or(window_start, |s| s.max(window_start)));
        let s = self.start_time.unwrap();

        let flow = self.flows.entry(id).or_default();
        flow.add_point(t);
        if flow.start_time().is_some_and(|fs| fs < s) {
            flow.delete_before(s);
        }

        self.all_traffic.add_point(t);
    }

    /// Evicts everything before the current window start, dropping any
    /// flow that becomes empty.
    pub fn sync(&mut self) {
        let Some(s) = self.start_time else {
            return;
        };
        self.flows.retain(|_, flow| {
            flow.delete_before(s);
            !flow.is_empty()
        });
        self.all_traffic.delete_before(s);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AnyBytePolicy;
    impl Policy for AnyBytePolicy {
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
    fn window_shifts_as_packets_arrive() {
        // scenario 4: fill 300s at t0, then a packet at t0+600 shifts start
        // to t0+301 and drops everything older.
        let mut store: FlowStore<AnyBytePolicy> = FlowStore::new(300);
        let t0 = 1_000_000i64;
        for i in 0..300 {
            store.add_packet(&[1], t0 + i);
        }
        store.add_packet(&[1], t0 + 600);
        assert_eq!(store.start_time(), Some(t0 + 301));
    }

    #[test]
    fn sync_drops_empty_flows() {
        let mut store: FlowStore<AnyBytePolicy> = FlowStore::new(10);
        store.add_packet(&[1], 0);
        store.add_packet(&[2], 0);
        for t in 1..20 {
            store.add_packet(&[2], t);
        }
        store.sync();
        // identifier 1's single point at t=0 is now outside the window.
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn invalid_packets_are_dropped() {
        let mut store: FlowStore<AnyBytePolicy> = FlowStore::new(10);
        store.add_packet(&[], 0);
        assert!(store.is_empty());
    }
}
