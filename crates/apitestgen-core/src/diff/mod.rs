//! Contract diff engine.
//!
//! Compares the IR of the current contract with the metadata recovered from
//! previously generated files and classifies every endpoint.
//!
//! ## Entry point
//!
//! ```ignore
//! use apitestgen_core::diff::{diff, render_human_summary, DuplicatePolicy};
//!
//! let outcome = diff(&spec, &metadata, DuplicatePolicy::LastWins)?;
//! println!("{}", render_human_summary(&outcome.result));
//! ```
//!
//! ## Guarantees
//!
//! - **Determinism**: every output sequence is ordered by path, then method.
//! - **Idempotence**: metadata produced from the same contract yields only Skip.
//! - **New statuses are changes**: a status missing from the recorded header
//!   is an Update, never a silent Skip.

pub mod engine;
pub mod human_summary;
pub mod model;

pub use engine::diff;
pub use human_summary::render_human_summary;
pub use model::{ChangeReason, DiffEntry, DiffOutcome, DiffResult, DuplicatePolicy};
