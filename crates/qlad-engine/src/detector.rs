use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use qlad_core::merge::intersect;
use qlad_core::{FlowStore, Identifier, Policy, Time};
use qlad_sync::{Signal, WorkerPool};

use crate::engine::{Engine, EngineConfig, EngineResult};
use crate::error::Result;

/// Consensus report over `N` independent random projections of the same
/// window: the identifiers every engine flagged as anomalous.
#[derive(Debug, Clone)]
pub struct DetectorResult {
    pub start_time: Time,
    pub end_time: Time,
    pub anomalous_ids: Vec<Identifier>,
    pub total_identifiers: usize,
}

/// `N` engines sharing one immutable [`FlowStore`] snapshot, running
/// concurrently on a [`WorkerPool`]. Submission happens eagerly in
/// [`Detector::spawn`]; completion is observed later via [`Detector::poll`]
/// (non-blocking) or [`Detector::wait`] (blocking), so the caller's capture
/// loop is never held up by detection.
pub struct Detector {
    done: Arc<Signal>,
    result: Arc<Mutex<Option<Result<DetectorResult>>>>,
}

impl Detector {
    /// Snapshots `store`, submits `hash_count` engines to `pool`, and
    /// returns immediately. The last engine to finish computes the
    /// intersection and publishes the result.
    pub fn spawn<P: Policy>(
        store: &FlowStore<P>,
        pool: &WorkerPool,
        hash_count: usize,
        config: EngineConfig,
    ) -> Detector {
        let snapshot = Arc::new(store.clone());
        let start_time = snapshot.start_time().unwrap_or_default();
        let end_time = snapshot.end_time().unwrap_or_default();
        let total_identifiers = snapshot.len();

        let done = Arc::new(Signal::new());
        let result: Arc<Mutex<Option<Result<DetectorResult>>>> = Arc::new(Mutex::new(None));
        let partials: Arc<Mutex<Vec<Option<Result<EngineResult>>>>> =
            Arc::new(Mutex::new((0..hash_count).map(|_| None).collect()));
        let remaining = Arc::new(AtomicUsize::new(hash_count));

        for h in 0..hash_count {
            let snapshot = Arc::clone(&snapshot);
            let partials = Arc::clone(&partials);
            let remaining = Arc::clone(&remaining);
            let done = Arc::clone(&done);
            let result = Arc::clone(&result);
            let engine = Engine::<P>::with_config(h, config);

            pool.submit(move || {
                let outcome = engine.run(&snapshot);
                partials.lock().expect("detector partials mutex poisoned")[h] = Some(outcome);

                if remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
                    let outcomes: Vec<Result<EngineResult>> = partials
                        .lock()
                        .expect("detector partials mutex poisoned")
                        .drain(..)
                        .map(|slot| slot.expect("every engine slot filled before the last one finishes"))
                        .collect();

                    let final_result = outcomes
                        .into_iter()
                        .collect::<Result<Vec<EngineResult>>>()
                        .map(|engine_results| {
                            let sequences: Vec<Vec<Identifier>> = engine_results
                                .into_iter()
                                .map(|r| r.anomalous_ids)
                                .collect();
                            DetectorResult {
                                start_time,
                                end_time,
                                anomalous_ids: intersect(&sequences),
                                total_identifiers,
                            }
                        });

                    *result.lock().expect("detector result mutex poisoned") = Some(final_result);
                    done.set();
                }
            });
        }

        Detector { done, result }
    }

    /// Non-blocking check: `Some` once every engine has finished.
    pub fn poll(&self) -> Option<Result<DetectorResult>> {
        if self.done.poll() {
            self.result.lock().expect("detector result mutex poisoned").take()
        } else {
            None
        }
    }

    /// Blocks until every engine has finished, then returns the result.
    pub fn wait(&self) -> Result<DetectorResult> {
        self.done.wait();
        self.result
            .lock()
            .expect("detector result mutex poisoned")
            .take()
            .expect("result published before the done signal is set")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qlad_core::AnalysedParameter;

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

    fn filled_store(loud: Option<(u32, u64)>) -> FlowStore<FirstByteMod4> {
        let mut store: FlowStore<FirstByteMod4> = FlowStore::new(300);
        for second in 0..300i64 {
            // 1,2,3-second jitter shared by every identifier: keeps per-second
            // variance nonzero at every power-of-two aggregation level (3
            // never divides 2^j) while leaving the population statistically
            // uniform, since every identifier sees the identical sequence.
            let rate = 1 + (second % 3) as u64;
            for id in 0u32..20 {
                for _ in 0..rate {
                    store.add_packet(&[id as u8], second);
                }
            }
        }
        if let Some((id, rate)) = loud {
            for second in 0..300i64 {
                for _ in 0..rate {
                    store.add_packet(&[id as u8], second);
                }
            }
        }
        store
    }

    #[test]
    fn consensus_reports_the_single_loud_identifier() {
        let store = filled_store(Some((0, 500)));
        let pool = WorkerPool::new(4);
        let config = EngineConfig {
            sketch_count: 4,
            aggregation_count: 4,
            threshold: 0.8,
            analysed_parameter: AnalysedParameter::Scale,
        };
        let detector = Detector::spawn(&store, &pool, 6, config);
        let result = detector.wait().unwrap();
        assert!(result.anomalous_ids.contains(&Identifier::IPv4(0)));
        pool.stop();
    }

    #[test]
    fn uniform_traffic_yields_no_consensus_anomalies() {
        let store = filled_store(None);
        let pool = WorkerPool::new(4);
        let config = EngineConfig {
            sketch_count: 4,
            aggregation_count: 4,
            threshold: 0.8,
            analysed_parameter: AnalysedParameter::Scale,
        };
        let detector = Detector::spawn(&store, &pool, 6, config);
        let result = detector.wait().unwrap();
        assert!(result.anomalous_ids.is_empty());
        pool.stop();
    }
}
