//! Signalling processes by PID.
//!
//! Unix goes through `nix`; Windows has no signals, so both operations
//! terminate the process through `sysinfo`.

use std::io;

#[cfg(unix)]
use nix::errno::Errno;
#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

/// Ask a process to stop the way Ctrl-C would (SIGINT).
///
/// Returns an `io::ErrorKind::NotFound` error when no such process exists.
pub fn interrupt_pid(pid: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        send(pid, Signal::SIGINT)
    }

    #[cfg(not(unix))]
    {
        kill_with_sysinfo(pid)
    }
}

/// Ask a process to terminate (SIGTERM).
pub fn terminate_pid(pid: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        send(pid, Signal::SIGTERM)
    }

    #[cfg(not(unix))]
    {
        kill_with_sysinfo(pid)
    }
}

/// Whether a process with this PID currently exists.
pub fn pid_exists(pid: u32) -> bool {
    #[cfg(unix)]
    {
        let Ok(raw) = i32::try_from(pid) else {
            return false;
        };
        // EPERM means the process exists but belongs to someone else
        matches!(signal::kill(Pid::from_raw(raw), None), Ok(()) | Err(Errno::EPERM))
    }

    #[cfg(not(unix))]
    {
        let sys = sysinfo::System::new_all();
        sys.process(sysinfo::Pid::from_u32(pid)).is_some()
    }
}

#[cfg(unix)]
fn send(pid: u32, sig: Signal) -> io::Result<()> {
    let raw = i32::try_from(pid)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, format!("invalid PID {pid}")))?;
    match signal::kill(Pid::from_raw(raw), sig) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no process with PID {pid}"),
        )),
        Err(e) => Err(io::Error::other(e)),
    }
}

#[cfg(not(unix))]
fn kill_with_sysinfo(pid: u32) -> io::Result<()> {
    let sys = sysinfo::System::new_all();
    let Some(process) = sys.process(sysinfo::Pid::from_u32(pid)) else {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no process with PID {pid}"),
        ));
    };
    if process.kill() {
        Ok(())
    } else {
        Err(io::Error::other(format!("failed to terminate PID {pid}")))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn own_process_exists() {
        assert!(pid_exists(std::process::id()));
    }

    #[test]
    fn unused_pid_is_not_found() {
        // Above any pid_max on Linux and macOS
        let pid = 2_000_000_000;
        assert!(!pid_exists(pid));
        let err = terminate_pid(pid).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn interrupt_stops_sleeping_child() {
        let mut child = tokio::process::Command::new("sleep")
            .arg("30")
            .spawn()
            .unwrap();
        let pid = child.id().unwrap();
        interrupt_pid(pid).unwrap();
        let status = child.wait().await.unwrap();
        assert!(!status.success());
    }
}
