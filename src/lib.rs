// Clip Sampler - Library Entry Point

pub mod config;
pub mod constants;
pub mod error;
pub mod fetch_plan;
pub mod manifest;
pub mod report;
pub mod sampling;
pub mod stats;

pub use config::SamplerConfig;
pub use error::{Result, SamplerError};
pub use fetch_plan::{FetchPlan, PlanOptions};
pub use manifest::Table;
pub use report::DistributionReport;
pub use sampling::{SampleOutcome, WeightedSampler};
