//! Terminal presentation: download progress and dialog prompts.

mod progress;
mod prompt;

pub use progress::DownloadProgress;
pub use prompt::{ConsoleAlerts, parse_choice};
