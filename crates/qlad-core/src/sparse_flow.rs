/// A second, as a Unix timestamp.
pub type Time = i64;

/// Sparse per-second packet counts for one identifier: an ordered sequence
/// of `(second, count)` pairs with strictly increasing `second`.
///
/// Points with the same second as the last recorded point merge into it
/// (the count is incremented); points strictly earlier than the last
/// recorded second are out-of-order and are dropped by the caller before
/// reaching this type (see [`crate::flow_store::FlowStore::add_packet`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseFlow {
    points: Vec<(Time, u32)>,
    total_count: u64,
}

impl SparseFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn start_time(&self) -> Option<Time> {
        self.points.first().map(|p| p.0)
    }

    pub fn end_time(&self) -> Option<Time> {
        self.points.last().map(|p| p.0)
    }

    /// Dense-equivalent span in seconds: `endTime - startTime + 1`. Zero for
    /// an empty flow.
    pub fn size(&self) -> u64 {
        match (self.start_time(), self.end_time()) {
            (Some(s), Some(e)) => (e - s + 1) as u64,
            _ => 0,
        }
    }

    /// Sum of all recorded counts.
    pub fn total_points(&self) -> u64 {
        self.total_count
    }

    pub fn points(&self) -> &[(Time, u32)] {
        &self.points
    }

    /// Appends one packet observed at second `t`. Returns `true` if the
    /// point was recorded, `false` if it was dropped as out-of-order
    /// (`t` strictly before the last recorded second).
    pub fn add_point(&mut self, t: Time) -> bool {
        match self.points.last_mut() {
            None => {
                self.points.push((t, 1));
            }
            Some(last) if t < last.0 => return false,
            Some(last) if t == last.0 => {
                last.1 += 1;
            }
            Some(_) => {
                self.points.push((t, 1));
            }
        }
        self.total_count += 1;
        true
    }

    /// Removes every point strictly before `t`. If the whole flow is stale
    /// (its end time is already before `t`), clears in one step.
    pub fn delete_before(&mut self, t: Time) {
        if let Some(end) = self.end_time() {
            if end < t {
                self.total_count = 0;
                self.points.clear();
                return;
            }
        }
        let split = self.points.partition_point(|p| p.0 < t);
        for (_, count) in self.points.drain(..split) {
            self.total_count -= count as u64;
        }
    }
}
