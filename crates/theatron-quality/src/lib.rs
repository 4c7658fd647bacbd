#![forbid(unsafe_code)]

mod advisor;
mod estimator;
mod types;

pub use advisor::QualityAdvisor;
pub use estimator::{Estimator, ThroughputEstimator};
pub use types::{QualityLevel, QualityOptions, SampleSource, TransferSample};
