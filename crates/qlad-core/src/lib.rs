//! Data model and statistics for the DNS traffic anomaly-detection
//! pipeline: the sliding-window flow store, sketch random-projection
//! layer, Gamma-distribution parameter estimation, and Mahalanobis-distance
//! scoring. Free of any capture, CLI, or threading concerns so it can be
//! driven by tests or by [`qlad-engine`](../qlad_engine/index.html) alike.

pub mod error;
pub mod flow_store;
pub mod gamma;
pub mod identifier;
pub mod mahalanobis;
pub mod merge;
pub mod policy;
pub mod sketch;
pub mod sparse_flow;
pub mod time_series;

pub use error::{Error, Result};
pub use flow_store::FlowStore;
pub use gamma::{AnalysedParameter, GammaParams};
pub use identifier::{Identifier, MAX_DOMAIN_LABEL_LEN};
pub use policy::Policy;
pub use sketch::Sketch;
pub use sparse_flow::{SparseFlow, Time};
pub use time_series::TimeSeries;
