//! Test-file rendering: file names, the pytest body and the machine-owned
//! marker region.

pub mod filename;
pub mod markers;
pub mod pytest;
pub mod python;

pub use filename::{collision_suffix, file_name_for, suffixed_file_name_for, test_stem};
pub use markers::{find_region, replace_region, MarkerError, NEGATIVE_END, NEGATIVE_START};
pub use pytest::{
    render_negative_region, render_test_file, RenderContext, DEFAULT_BASE_URL, DEFAULT_BASE_URL_ENV,
    TOKEN_ENV,
};
