//! Analysis orchestration and result aggregation
//!
//! - Configuration-scoped context that owns the precomputed filterbanks
//! - Result types
//! - Recording-level summaries
//! - Metadata

pub mod context;
pub mod metadata;
pub mod result;
pub mod summary;
