use std::collections::VecDeque;

use qlad_capture::PacketSource;
use qlad_core::{FlowStore, Policy};
use qlad_sync::WorkerPool;

use crate::detector::{Detector, DetectorResult};
use crate::engine::EngineConfig;
use crate::error::Result;

/// Drives a [`PacketSource`] against a [`FlowStore`], spawning a
/// [`Detector`] at the end of warm-up and again after every detection
/// interval, without ever blocking capture on detection.
///
/// Lifecycle: **warm-up** (capture a full window, spawn detector #0),
/// **loop** (capture one interval, sync the store, spawn the next
/// detector, reap whichever earlier detectors have finished), **drain**
/// (once capture ends, block until every in-flight detector finishes).
pub struct SlidingController<P: Policy, S: PacketSource> {
    store: FlowStore<P>,
    source: S,
    pool: WorkerPool,
    window_size: u64,
    detection_interval: u64,
    hash_count: usize,
    engine_config: EngineConfig,
    in_flight: VecDeque<Detector>,
}

impl<P: Policy, S: PacketSource> SlidingController<P, S> {
    /// `source` must already be open. `detection_interval` must be `<=
    /// window_size` (enforced by `qlad-cli`'s config validation, not
    /// re-checked here).
    pub fn new(
        window_size: u64,
        detection_interval: u64,
        hash_count: usize,
        engine_config: EngineConfig,
        thread_count: usize,
        source: S,
    ) -> Self {
        Self {
            store: FlowStore::new(window_size),
            source,
            pool: WorkerPool::new(thread_count),
            window_size,
            detection_interval,
            hash_count,
            engine_config,
            in_flight: VecDeque::new(),
        }
    }

    /// Runs warm-up, the capture/detect loop, and drain, invoking
    /// `on_result` once per completed detector in submission order. Stops
    /// and returns the first error surfaced by capture or by any detector
    /// (a fatal, per-run condition per the error taxonomy).
    pub fn run(mut self, mut on_result: impl FnMut(DetectorResult)) -> Result<()> {
        self.source.start_capture(&mut self.store, self.window_size)?;
        self.in_flight.push_back(self.spawn_detector());

        while self.source.can_capture() {
            self.source
                .start_capture(&mut self.store, self.detection_interval)?;
            self.store.sync();
            self.in_flight.push_back(self.spawn_detector());
            self.reap(&mut on_result)?;
        }

        while let Some(detector) = self.in_flight.pop_front() {
            on_result(detector.wait()?);
        }

        self.source.close();
        self.pool.stop();
        Ok(())
    }

    fn spawn_detector(&self) -> Detector {
        Detector::spawn(&self.store, &self.pool, self.hash_count, self.engine_config)
    }

    /// Pops and reports every detector at the front of the FIFO that has
    /// already finished; stops at the first one still running.
    fn reap(&mut self, on_result: &mut impl FnMut(DetectorResult)) -> Result<()> {
        while let Some(front) = self.in_flight.front() {
            match front.poll() {
                Some(result) => {
                    self.in_flight.pop_front();
                    on_result(result?);
                }
                None => break,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlad_core::{AnalysedParameter, Identifier};
    use qlad_capture::{CaptureConfig, VecPacketSource};

    struct FirstByteMod4;
    impl Policy for FirstByteMod4 {
        const NAME: &'static str = "test";
        fn parse(data: &[u8]) -> Option<Identifier> {
            data.first().map(|&b| Identifier::IPv4(b as u32))
        }
        fn hash(index: usize, id: &Identifier) -> u32 {
            let Identifier::IPv4(v) = id else { return 0 };
            v.wrapping_add(index as u32)
        }
    }

    fn packets(loud: Option<u32>) -> Vec<(Vec<u8>, i64)> {
        let mut out = Vec::new();
        for second in 0..20i64 {
            for id in 0u32..10 {
                out.push((vec![id as u8], second));
            }
            if let Some(loud_id) = loud {
                for _ in 0..100 {
                    out.push((vec![loud_id as u8], second));
                }
            }
        }
        out
    }

    #[test]
    fn drains_every_in_flight_detector_before_returning() {
        let mut source = VecPacketSource::new(packets(Some(0)));
        source.open(&CaptureConfig::default()).unwrap();

        let config = EngineConfig {
            sketch_count: 4,
            aggregation_count: 3,
            threshold: 0.8,
            analysed_parameter: AnalysedParameter::Scale,
        };
        let controller: SlidingController<FirstByteMod4, VecPacketSource> =
            SlidingController::new(10, 5, 4, config, 2, source);

        let mut reports = Vec::new();
        controller.run(|result| reports.push(result)).unwrap();

        assert!(!reports.is_empty());
    }
}
