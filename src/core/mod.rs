//! Core Module - Scoring Pipeline
//!
//! Feature extraction, aggregation, scoring and tier classification.
//! No I/O here except through the provider traits.

pub mod aggregator;
pub mod features;
pub mod pipeline;
pub mod scoring;
pub mod tier;

pub use aggregator::*;
pub use features::*;
pub use pipeline::*;
pub use scoring::*;
pub use tier::*;
