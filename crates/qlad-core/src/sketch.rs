use crate::identifier::Identifier;
use crate::sparse_flow::SparseFlow;
use crate::time_series::TimeSeries;

/// One hash bucket's worth of flows, summed into a single dense time
/// series. Members must be inserted in strictly ascending `Identifier`
/// order; the caller (the engine, iterating a [`crate::flow_store::FlowStore`]
/// which is itself ordered by identifier) guarantees this.
#[derive(Debug, Clone)]
pub struct Sketch {
    series: TimeSeries,
    members: Vec<Identifier>,
}

impl Sketch {
    pub fn new(start_time: crate::sparse_flow::Time, len: usize) -> Self {
        Self {
            series: TimeSeries::new(start_time, len, 1),
            members: Vec::new(),
        }
    }

    pub fn series(&self) -> &TimeSeries {
        &self.series
    }

    pub fn identifiers(&self) -> &[Identifier] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Adds `flow`'s per-second counts into this sketch's series and
    /// records `id` as a member. Panics if `flow` does not fit the
    /// sketch's fixed window — a caller precondition, not a data error.
    pub fn add_flow(&mut self, id: Identifier, flow: &SparseFlow) {
        let (Some(flow_start), Some(flow_end)) = (flow.start_time(), flow.end_time()) else {
            return; // empty flow, nothing to add
        };
        assert!(
            flow_start >= self.series.start_time(),
            "flow starts before sketch window"
        );
        assert!(
            (flow_end - self.series.start_time()) < self.series.len() as i64,
            "flow extends past sketch window"
        );
        for &(t, count) in flow.points() {
            let offset = (t - self.series.start_time()) as usize;
            self.series.add_at(offset, count as u64);
        }
        self.members.push(id);
    }
}
