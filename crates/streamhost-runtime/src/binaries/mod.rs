//! ffmpeg/ffprobe resolution and installation.

mod archive;
mod resolver;

pub use archive::{ArchiveInstaller, ExtractError};
pub use resolver::{BinaryResolver, locate_command};
