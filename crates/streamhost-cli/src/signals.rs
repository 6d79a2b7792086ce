//! Host signal handling.
//!
//! The first Ctrl-C cancels the shared shutdown token so handlers can stop
//! cleanly; a second Ctrl-C, SIGTERM or SIGHUP exits through the host so
//! exit hooks still run.

use std::io;
use std::sync::Arc;

use streamhost_core::ports::HostLifecycle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Exit code after a second Ctrl-C (128 + SIGINT).
pub const INTERRUPT_EXIT: i32 = 130;
/// Exit code after SIGTERM (128 + 15).
pub const TERMINATED_EXIT: i32 = 143;
/// Exit code after SIGHUP (128 + 1).
pub const HANGUP_EXIT: i32 = 129;

/// Start watching for signals.
///
/// Termination handlers are registered before this returns.
pub fn watch(token: CancellationToken, host: Arc<dyn HostLifecycle>) -> io::Result<JoinHandle<()>> {
    let mut termination = Termination::register()?;
    Ok(tokio::spawn(async move {
        tokio::select! {
            () = interrupts(token, Arc::clone(&host)) => {}
            code = termination.recv() => {
                warn!(code, "Termination signal received; running exit hooks");
                host.exit(code);
            }
        }
    }))
}

async fn interrupts(token: CancellationToken, host: Arc<dyn HostLifecycle>) {
    if tokio::signal::ctrl_c().await.is_err() {
        return std::future::pending().await;
    }
    info!("Interrupt received; shutting down");
    token.cancel();

    if tokio::signal::ctrl_c().await.is_err() {
        return std::future::pending().await;
    }
    warn!("Second interrupt; exiting immediately");
    host.exit(INTERRUPT_EXIT);
}

#[cfg(unix)]
struct Termination {
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Termination {
    fn register() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};
        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            hangup: signal(SignalKind::hangup())?,
        })
    }

    async fn recv(&mut self) -> i32 {
        tokio::select! {
            _ = self.terminate.recv() => TERMINATED_EXIT,
            _ = self.hangup.recv() => HANGUP_EXIT,
        }
    }
}

/// Console window closed or system shutting down.
#[cfg(windows)]
struct Termination {
    close: tokio::signal::windows::CtrlClose,
    shutdown: tokio::signal::windows::CtrlShutdown,
}

#[cfg(windows)]
impl Termination {
    fn register() -> io::Result<Self> {
        Ok(Self {
            close: tokio::signal::windows::ctrl_close()?,
            shutdown: tokio::signal::windows::ctrl_shutdown()?,
        })
    }

    async fn recv(&mut self) -> i32 {
        tokio::select! {
            _ = self.close.recv() => 1,
            _ = self.shutdown.recv() => 1,
        }
    }
}

#[cfg(not(any(unix, windows)))]
struct Termination;

#[cfg(not(any(unix, windows)))]
impl Termination {
    #[allow(clippy::unnecessary_wraps)]
    const fn register() -> io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> i32 {
        std::future::pending().await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use streamhost_core::ports::ExitHook;

    #[derive(Default)]
    struct RecordingHost {
        hooks: Mutex<Vec<ExitHook>>,
        codes: Mutex<Vec<i32>>,
    }

    impl HostLifecycle for RecordingHost {
        fn on_exit(&self, hook: ExitHook) {
            self.hooks.lock().unwrap().push(hook);
        }

        fn run_exit_hooks(&self) {
            let hooks = std::mem::take(&mut *self.hooks.lock().unwrap());
            for hook in hooks.into_iter().rev() {
                hook();
            }
        }

        fn exit(&self, code: i32) {
            self.codes.lock().unwrap().push(code);
            self.run_exit_hooks();
        }
    }

    #[tokio::test]
    async fn test_hangup_exits_through_host() {
        let host = Arc::new(RecordingHost::default());
        let ran = Arc::new(AtomicBool::new(false));
        {
            let ran = Arc::clone(&ran);
            host.on_exit(Box::new(move || ran.store(true, Ordering::SeqCst)));
        }
        let token = CancellationToken::new();
        let handle = watch(token.clone(), host.clone()).unwrap();

        let status = std::process::Command::new("kill")
            .args(["-HUP", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("watcher should finish after SIGHUP")
            .unwrap();
        assert_eq!(*host.codes.lock().unwrap(), vec![HANGUP_EXIT]);
        assert!(ran.load(Ordering::SeqCst));
        assert!(!token.is_cancelled());
    }
}
