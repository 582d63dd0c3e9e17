//! Pipeline commands.
//!
//! Each command runs to completion as one synchronous pass and owns the
//! start/end logging of its operation.

pub mod clean;
pub mod diff_only;
pub mod generate;
pub mod options;
pub mod summary;

pub use clean::{clean, CleanOptions};
pub use diff_only::{diff_only, DiffOptions, DiffReport};
pub use generate::{generate, GenerateOptions};
pub use options::ConfigOverrides;
pub use summary::RunSummary;
