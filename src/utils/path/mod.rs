//! Path utilities.
//!
//! - [`fs`]: Filesystem path normalization (`normalize_path`, `display_name`)

pub mod fs;

pub use fs::{display_name, normalize_path};
