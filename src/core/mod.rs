//! Core business logic: loading, cleaning, scoring and summarizing funds

pub mod aggregate;
pub mod clean;
pub mod config;
pub mod error;
pub mod export;
pub mod fund;
pub mod loader;
pub mod log;
pub mod normalize;
pub mod pipeline;
pub mod scoring;
pub mod stats;

// Re-export main types for cleaner imports
pub use error::{ExportError, LoadError, PipelineError, Stage};
pub use fund::{Fund, NormalizedFund, RankedFund, RawFund, RiskLevel};
pub use pipeline::{PipelineOptions, PipelineOutput};
