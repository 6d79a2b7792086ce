//! Host-process lifecycle: exit hooks run on every way out.

use std::sync::{Arc, Mutex, PoisonError};

use streamhost_core::ports::{ExitHook, HostLifecycle};
use tracing::{debug, info};

/// Exit-hook registry for the real host process.
///
/// Hooks run on [`HostLifecycle::exit`], on
/// [`HostLifecycle::run_exit_hooks`] (called by the CLI after Ctrl-C or a
/// normal return), and from the panic hook installed by [`ProcessHost::install`].
#[derive(Default)]
pub struct ProcessHost {
    hooks: Mutex<Vec<ExitHook>>,
}

impl std::fmt::Debug for ProcessHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessHost")
            .field("hooks", &self.hook_count())
            .finish()
    }
}

impl ProcessHost {
    /// Create a host and chain a panic hook that runs the exit hooks.
    pub fn install() -> Arc<Self> {
        let host = Arc::new(Self::default());
        let for_panic = Arc::downgrade(&host);
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            if let Some(host) = for_panic.upgrade() {
                host.run_exit_hooks();
            }
            previous(info);
        }));
        host
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn take_hooks(&self) -> Vec<ExitHook> {
        std::mem::take(&mut *self.hooks.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl HostLifecycle for ProcessHost {
    fn on_exit(&self, hook: ExitHook) {
        self.hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(hook);
    }

    fn run_exit_hooks(&self) {
        let hooks = self.take_hooks();
        if !hooks.is_empty() {
            debug!(count = hooks.len(), "Running exit hooks");
        }
        // Most recently registered first
        for hook in hooks.into_iter().rev() {
            hook();
        }
    }

    fn exit(&self, code: i32) {
        info!(code, "Host exiting");
        self.run_exit_hooks();
        std::process::exit(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn hooks_run_once_in_reverse_order() {
        let host = ProcessHost::default();
        let order = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let order = Arc::clone(&order);
            host.on_exit(Box::new(move || order.lock().unwrap().push(i)));
        }
        assert_eq!(host.hook_count(), 3);

        host.run_exit_hooks();
        host.run_exit_hooks();

        assert_eq!(*order.lock().unwrap(), vec![2, 1, 0]);
        assert_eq!(host.hook_count(), 0);
    }

    #[test]
    fn panic_runs_hooks() {
        let host = ProcessHost::install();
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        host.on_exit(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let result = std::thread::spawn(|| panic!("boom")).join();
        assert!(result.is_err());
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }
}
