//! Feature engineering: rolling statistics and the per-symbol pipeline.

pub mod engineer;
pub mod rolling;

pub use engineer::{FeatureConfig, FeaturePipeline};
