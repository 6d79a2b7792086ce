//! Line readers for child-process output.
//!
//! The streaming server can emit non-UTF-8 bytes, which would end a
//! `BufReader::lines()` loop early. Lines are read as bytes and decoded
//! lossily instead.

use std::sync::Arc;

use streamhost_core::ports::ServerLogSinkPort;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::debug;

/// Forward every line of `stream` to `sink` until EOF.
pub fn spawn_stream_reader(
    stream: impl AsyncRead + Unpin + Send + 'static,
    pid: u32,
    stream_type: &'static str,
    sink: Arc<dyn ServerLogSinkPort>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }
                    sink.append(stream_type, String::from_utf8_lossy(&buf).into_owned());
                }
                Err(e) => {
                    debug!(pid, stream_type, error = %e, "Output reader stopping on read error");
                    break;
                }
            }
        }

        sink.flush();
        debug!(pid, stream_type, "Output reader finished");
    })
}
