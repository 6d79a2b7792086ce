//! Download progress bars driven by the fetcher's byte callback.

use std::sync::{Arc, Mutex, PoisonError};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use streamhost_runtime::ProgressCallback;

/// One bar per download; a new bar starts when the byte count goes backwards.
pub struct DownloadProgress {
    bar: Mutex<Option<ProgressBar>>,
    target: fn() -> ProgressDrawTarget,
}

impl std::fmt::Debug for DownloadProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadProgress").finish_non_exhaustive()
    }
}

impl Default for DownloadProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl DownloadProgress {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
            target: ProgressDrawTarget::stderr,
        }
    }

    /// Progress that tracks state without drawing.
    pub fn hidden() -> Self {
        Self {
            bar: Mutex::new(None),
            target: ProgressDrawTarget::hidden,
        }
    }

    fn create_bar(&self, total: u64) -> ProgressBar {
        if total > 0 {
            let bar = ProgressBar::with_draw_target(Some(total), (self.target)());
            if let Ok(style) = ProgressStyle::default_bar().template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})",
            ) {
                bar.set_style(style.progress_chars("█▓░"));
            }
            bar
        } else {
            let bar = ProgressBar::with_draw_target(None, (self.target)());
            if let Ok(style) =
                ProgressStyle::default_spinner().template("{spinner:.green} {bytes} downloaded")
            {
                bar.set_style(style);
            }
            bar
        }
    }

    /// Record `downloaded` of `total` bytes (`total` is 0 when unknown).
    pub fn update(&self, downloaded: u64, total: u64) {
        let mut guard = self.bar.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(bar) = guard.as_ref()
            && downloaded < bar.position()
        {
            bar.finish_and_clear();
            *guard = None;
        }

        let bar = guard.get_or_insert_with(|| self.create_bar(total));
        if total > 0 {
            bar.set_length(total);
        }
        bar.set_position(downloaded);

        if total > 0 && downloaded >= total {
            if let Some(bar) = guard.take() {
                bar.finish_and_clear();
            }
        }
    }

    /// Whether a bar is currently in flight.
    pub fn is_active(&self) -> bool {
        self.bar
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Adapter for [`streamhost_runtime::ReqwestFetcher::with_progress`].
    pub fn callback(self: &Arc<Self>) -> ProgressCallback {
        let progress = Arc::clone(self);
        Arc::new(move |downloaded, total| progress.update(downloaded, total))
    }
}
