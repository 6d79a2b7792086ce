//! Child-process plumbing shared by the server supervisor and service locator.

mod shutdown;
mod signal;
mod stream;

pub use shutdown::shutdown_child;
pub use signal::{interrupt_pid, pid_exists, terminate_pid};
pub use stream::spawn_stream_reader;
