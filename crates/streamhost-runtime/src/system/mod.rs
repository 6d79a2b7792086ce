//! Operating-system adapters: external commands, time, desktop handlers.

mod clock;
mod commands;
mod open;
pub mod parse;

pub use clock::TokioClock;
pub use commands::TokioCommandRunner;
pub use open::{open_command, open_detached};
