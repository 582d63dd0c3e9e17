//! apitestgen Engine - Orchestration layer
//!
//! Provides the Generation/Update Engine and the pipeline commands that
//! coordinate the pure core with the file-system store.

pub mod commands;
pub mod generation;

pub use generation::{apply, GenerationContext, GenerationPlan};
