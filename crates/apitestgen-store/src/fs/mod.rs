//! File-system primitives for generated files.

pub mod atomic;
pub mod executor;

pub use atomic::atomic_write;
pub use executor::{execute, ExecutionReport};
