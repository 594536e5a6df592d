use std::marker::PhantomData;

use qlad_core::mahalanobis::{self, ReferenceMoments};
use qlad_core::merge::merge_union;
use qlad_core::{AnalysedParameter, Error, FlowStore, GammaParams, Identifier, Policy, Sketch};

use crate::error::Result;

/// One random-projection pipeline instance: partitions a [`FlowStore`]
/// snapshot into `sketch_count` buckets via hash function `hash_index`,
/// estimates Gamma parameters at `aggregation_count` aggregation levels,
/// scores each sketch's squared Mahalanobis distance from the population,
/// and unions the members of every sketch scoring above `threshold`.
pub struct Engine<P: Policy> {
    pub hash_index: usize,
    pub sketch_count: usize,
    pub aggregation_count: usize,
    pub threshold: f64,
    pub analysed_parameter: AnalysedParameter,
    _policy: PhantomData<P>,
}

/// One engine's completed run: the sorted, deduplicated set of identifiers
/// it flagged as anomalous.
#[derive(Debug, Clone, Default)]
pub struct EngineResult {
    pub anomalous_ids: Vec<Identifier>,
}

/// The parameters shared by every engine in one detector, independent of
/// hash-function index.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    pub sketch_count: usize,
    pub aggregation_count: usize,
    pub threshold: f64,
    pub analysed_parameter: AnalysedParameter,
}

impl<P: Policy> Engine<P> {
    pub fn with_config(hash_index: usize, config: EngineConfig) -> Self {
        Self::new(
            hash_index,
            config.sketch_count,
            config.aggregation_count,
            config.threshold,
            config.analysed_parameter,
        )
    }

    pub fn new(
        hash_index: usize,
        sketch_count: usize,
        aggregation_count: usize,
        threshold: f64,
        analysed_parameter: AnalysedParameter,
    ) -> Self {
        assert!(sketch_count >= 1, "sketch_count must be at least 1");
        assert!(
            (1..=31).contains(&aggregation_count),
            "aggregation_count must be in [1, 31]"
        );
        Self {
            hash_index,
            sketch_count,
            aggregation_count,
            threshold,
            analysed_parameter,
            _policy: PhantomData,
        }
    }

    /// Runs the full `fill -> estimate -> score -> select` pipeline against
    /// an immutable snapshot of the flow store.
    pub fn run(&self, store: &FlowStore<P>) -> Result<EngineResult> {
        let sketches = self.fill_sketches(store)?;
        let per_sketch_params = self.estimate_parameters(&sketches);
        let reference = ReferenceMoments::compute(&per_sketch_params, self.aggregation_count);

        let mut anomalous_members = Vec::new();
        for (k, sketch) in sketches.iter().enumerate() {
            let distance = mahalanobis::score(&per_sketch_params[k], &reference, self.analysed_parameter)?;
            if distance > self.threshold {
                anomalous_members.push(sketch.identifiers().to_vec());
            }
        }

        Ok(EngineResult {
            anomalous_ids: merge_union(&anomalous_members, Identifier::clone),
        })
    }

    fn fill_sketches(&self, store: &FlowStore<P>) -> Result<Vec<Sketch>> {
        let Some(start_time) = store.start_time() else {
            return Err(Error::EmptySketch(0).into());
        };
        let len = store.current_window() as usize;
        let mut sketches: Vec<Sketch> = (0..self.sketch_count)
            .map(|_| Sketch::new(start_time, len))
            .collect();

        for (id, flow) in store.iter() {
            let bucket = (P::hash(self.hash_index, id) as usize) % self.sketch_count;
            sketches[bucket].add_flow(id.clone(), flow);
        }

        for (k, sketch) in sketches.iter().enumerate() {
            if sketch.is_empty() {
                return Err(Error::EmptySketch(k).into());
            }
        }
        Ok(sketches)
    }

    fn estimate_parameters(&self, sketches: &[Sketch]) -> Vec<Vec<GammaParams>> {
        sketches
            .iter()
            .map(|sketch| {
                (0..self.aggregation_count)
                    .map(|j| {
                        let factor = 1u64 << j;
                        let aggregated = sketch.series().aggregate(factor);
                        GammaParams::estimate(aggregated.as_slice())
                    })
                    .collect()
            })
            .collect()
    }
}
