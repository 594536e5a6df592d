//! Wires `qlad-core`'s statistics, `qlad-sync`'s worker pool, and
//! `qlad-capture`'s packet sources into the running pipeline: one
//! [`Engine`] per random projection, a [`Detector`] for N-way consensus,
//! and a [`SlidingController`] that drives the capture/detect loop.

mod controller;
mod detector;
mod engine;
mod error;

pub use controller::SlidingController;
pub use detector::{Detector, DetectorResult};
pub use engine::{Engine, EngineConfig, EngineResult};
pub use error::{Error, Result};
