//! Server log sink port.
//!
//! Destination for the streaming server's stdout/stderr lines.

/// Port for appending server log lines to a sink.
///
/// Implementations should be thread-safe and non-blocking where possible.
pub trait ServerLogSinkPort: Send + Sync {
    /// Append a log line from the server process.
    ///
    /// * `stream_type` - Either "stdout" or "stderr"
    /// * `line` - The log line content (without trailing newline)
    fn append(&self, stream_type: &str, line: String);

    /// Flush buffered output to its destination.
    fn flush(&self);
}
