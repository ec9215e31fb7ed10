// src/status/mod.rs
pub mod classifier;
pub mod pipeline;

pub use classifier::{status_class, ProbeFailure};
pub use pipeline::{Prober, ReqwestProber, StatusOutcome, StatusPipeline, StatusReport};
