//! Infrastructure layer for filesystem interactions.

pub mod paths;

pub use paths::{ensure_file, is_exist};
