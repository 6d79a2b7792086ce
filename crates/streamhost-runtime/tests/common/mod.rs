//! Fakes for the runtime ports, shared by the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use streamhost_core::ports::{
    Alert, AlertPresenter, Clock, CommandError, CommandOutput, CommandRunner, DownloadError,
    ExitHook, ExternalCommand, Fetcher, HostLifecycle,
};
use streamhost_core::{PlatformTarget, ProvisionConfig};
use streamhost_runtime::ProvisionContext;
use zip::write::SimpleFileOptions;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

type Responder = dyn Fn(&ExternalCommand) -> Result<CommandOutput, CommandError> + Send + Sync;

/// Answers commands from a closure and records every call.
pub struct FakeCommands {
    responder: Box<Responder>,
    calls: Mutex<Vec<ExternalCommand>>,
    spawned: Mutex<Vec<ExternalCommand>>,
}

impl FakeCommands {
    pub fn new(
        responder: impl Fn(&ExternalCommand) -> Result<CommandOutput, CommandError>
        + Send
        + Sync
        + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            calls: Mutex::new(Vec::new()),
            spawned: Mutex::new(Vec::new()),
        })
    }

    /// Every command exits with status 1: nothing installed, nothing running.
    pub fn nothing_installed() -> Arc<Self> {
        Self::new(|_| Ok(CommandOutput::failed(1, "")))
    }

    pub fn calls(&self) -> Vec<ExternalCommand> {
        self.calls.lock().unwrap().clone()
    }

    pub fn spawned(&self) -> Vec<ExternalCommand> {
        self.spawned.lock().unwrap().clone()
    }

    pub fn count(&self, program: &str, first: &str) -> usize {
        self.calls().iter().filter(|c| c.is(program, first)).count()
    }

    pub fn ran(&self, needle: &str) -> bool {
        self.calls().iter().any(|c| c.to_string().contains(needle))
    }
}

#[async_trait]
impl CommandRunner for FakeCommands {
    async fn output(&self, command: &ExternalCommand) -> Result<CommandOutput, CommandError> {
        self.calls.lock().unwrap().push(command.clone());
        (self.responder)(command)
    }

    fn spawn_detached(&self, command: &ExternalCommand) -> Result<Option<u32>, CommandError> {
        self.spawned.lock().unwrap().push(command.clone());
        Ok(Some(4242))
    }
}

// ---------------------------------------------------------------------------
// Fetcher
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum FakeResponse {
    Bytes(Vec<u8>),
    Text(String),
    Fail,
}

/// Serves canned responses by URL and counts requests.
#[derive(Default)]
pub struct FakeFetcher {
    responses: Mutex<HashMap<String, FakeResponse>>,
    requests: AtomicUsize,
    urls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn serve(&self, url: &str, response: FakeResponse) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    fn lookup(&self, url: &str) -> Option<FakeResponse> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        self.responses.lock().unwrap().get(url).cloned()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, DownloadError> {
        match self.lookup(url) {
            Some(FakeResponse::Text(text)) => Ok(text),
            Some(FakeResponse::Bytes(bytes)) => Ok(String::from_utf8_lossy(&bytes).into_owned()),
            _ => Err(DownloadError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    async fn download(&self, url: &str, dest: &Path) -> Result<u64, DownloadError> {
        let bytes = match self.lookup(url) {
            Some(FakeResponse::Bytes(bytes)) => bytes,
            Some(FakeResponse::Text(text)) => text.into_bytes(),
            _ => {
                return Err(DownloadError::Status {
                    url: url.to_string(),
                    status: 404,
                });
            }
        };
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, &bytes)?;
        Ok(bytes.len() as u64)
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Time advances only when something sleeps.
pub struct VirtualClock {
    base: Instant,
    elapsed: Mutex<Duration>,
}

impl VirtualClock {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            base: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        })
    }

    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock().unwrap()
    }
}

#[async_trait]
impl Clock for VirtualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        *self.elapsed.lock().unwrap() += duration;
        tokio::task::yield_now().await;
    }
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

type Answer = Box<dyn Fn(&Alert) -> Option<usize> + Send + Sync>;

/// Answers alerts in order; once the script runs out every alert is closed.
#[derive(Default)]
pub struct ScriptedAlerts {
    answers: Mutex<VecDeque<Answer>>,
    shown: Mutex<Vec<Alert>>,
}

impl ScriptedAlerts {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn answering(choices: &[Option<usize>]) -> Arc<Self> {
        let alerts = Self::new();
        for choice in choices.iter().copied() {
            alerts.then(move |_| choice);
        }
        alerts
    }

    /// Queue an answer computed when the alert is shown.
    pub fn then(&self, answer: impl Fn(&Alert) -> Option<usize> + Send + Sync + 'static) {
        self.answers.lock().unwrap().push_back(Box::new(answer));
    }

    pub fn shown(&self) -> Vec<Alert> {
        self.shown.lock().unwrap().clone()
    }
}

impl AlertPresenter for ScriptedAlerts {
    fn show_alert(&self, alert: &Alert) -> Option<usize> {
        self.shown.lock().unwrap().push(alert.clone());
        let answer = self.answers.lock().unwrap().pop_front();
        answer.and_then(|answer| answer(alert))
    }
}

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// Records exit codes instead of exiting.
#[derive(Default)]
pub struct RecordingHost {
    hooks: Mutex<Vec<ExitHook>>,
    exits: Mutex<Vec<i32>>,
}

impl RecordingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn exit_codes(&self) -> Vec<i32> {
        self.exits.lock().unwrap().clone()
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.lock().unwrap().len()
    }
}

impl HostLifecycle for RecordingHost {
    fn on_exit(&self, hook: ExitHook) {
        self.hooks.lock().unwrap().push(hook);
    }

    fn run_exit_hooks(&self) {
        let hooks = std::mem::take(&mut *self.hooks.lock().unwrap());
        for hook in hooks {
            hook();
        }
    }

    fn exit(&self, code: i32) {
        self.exits.lock().unwrap().push(code);
        self.run_exit_hooks();
    }
}

// ---------------------------------------------------------------------------
// Wiring and fixtures
// ---------------------------------------------------------------------------

pub struct Harness {
    pub ctx: ProvisionContext,
    pub commands: Arc<FakeCommands>,
    pub fetcher: Arc<FakeFetcher>,
    pub clock: Arc<VirtualClock>,
    pub alerts: Arc<ScriptedAlerts>,
    pub host: Arc<RecordingHost>,
}

impl Harness {
    pub fn new(data_dir: &Path, platform: PlatformTarget, commands: Arc<FakeCommands>) -> Self {
        Self::with_alerts(data_dir, platform, commands, ScriptedAlerts::new())
    }

    pub fn with_alerts(
        data_dir: &Path,
        platform: PlatformTarget,
        commands: Arc<FakeCommands>,
        alerts: Arc<ScriptedAlerts>,
    ) -> Self {
        let mut config = ProvisionConfig::with_data_dir(data_dir.join("data"));
        config.temp_dir = data_dir.join("tmp");
        let fetcher = FakeFetcher::new();
        let clock = VirtualClock::new();
        let host = RecordingHost::new();
        let ctx = ProvisionContext::new(
            config,
            platform,
            commands.clone(),
            fetcher.clone(),
            clock.clone(),
            alerts.clone(),
            host.clone(),
        );
        Self {
            ctx,
            commands,
            fetcher,
            clock,
            alerts,
            host,
        }
    }

    /// Rebuild the context after changing its configuration.
    pub fn reconfigure(&mut self, change: impl FnOnce(&mut ProvisionConfig)) {
        let mut config = self.ctx.config.clone();
        change(&mut config);
        self.ctx = ProvisionContext::new(
            config,
            self.ctx.platform,
            self.commands.clone(),
            self.fetcher.clone(),
            self.clock.clone(),
            self.alerts.clone(),
            self.host.clone(),
        );
    }

    pub fn write_server_js(&self, contents: &str) {
        let path = self.ctx.paths.server_js_path();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }
}

/// In-memory zip with the given `(name, contents)` entries.
/// Names ending in `/` become directories.
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, contents) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(contents).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// A file that exists, for locate-command output.
pub fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"").unwrap();
}
