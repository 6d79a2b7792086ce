//! Host-process lifecycle port.
//!
//! Components that own resources outliving a single call (the supervised
//! server process, its log file) register exit hooks here. The host runs them
//! on every exit path before the process goes away.

/// A cleanup action run once when the host exits.
pub type ExitHook = Box<dyn FnOnce() + Send>;

pub trait HostLifecycle: Send + Sync {
    /// Register a hook to run on host exit.
    fn on_exit(&self, hook: ExitHook);

    /// Run and clear all registered hooks. Safe to call more than once.
    fn run_exit_hooks(&self);

    /// Run exit hooks, then terminate the host with `code`.
    ///
    /// Production implementations do not return. Test implementations record
    /// the code and return so the caller can observe what happened next.
    fn exit(&self, code: i32);
}
