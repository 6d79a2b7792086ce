//! Path utilities for the streamhost user-data directory.
//!
//! # Design
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - No interactive/terminal I/O - adapters handle user prompts separately
//! - Layout is computed from an explicit data dir, never from globals

mod error;
mod platform;
mod streaming;

pub use error::PathError;
pub use platform::{DATA_DIR_ENV, data_root};
pub use streaming::StreamingPaths;
