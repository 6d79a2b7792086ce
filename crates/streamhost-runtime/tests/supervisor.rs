//! Launching the streaming server process.

mod common;

use common::{FakeCommands, Harness};
use streamhost_core::{Arch, Os, PlatformTarget};
use streamhost_runtime::{StreamingServer, SupervisorError};

const LINUX_X64: PlatformTarget = PlatformTarget::new(Os::Linux, Arch::X64);

#[tokio::test]
async fn missing_script_exits_host_and_spawns_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let h = Harness::new(tmp.path(), LINUX_X64, FakeCommands::nothing_installed());

    let result = StreamingServer::new(&h.ctx).start().await;

    assert!(matches!(result, Err(SupervisorError::ServerScriptMissing(_))));
    assert_eq!(h.host.exit_codes(), vec![1]);
    assert_eq!(h.host.hook_count(), 0);
    assert!(!h.ctx.paths.log_file_path().exists());
}

#[tokio::test]
async fn missing_runtime_is_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let mut h = Harness::new(tmp.path(), LINUX_X64, FakeCommands::nothing_installed());
    h.reconfigure(|c| c.node_binary = "no-such-js-runtime-4711".to_string());
    h.write_server_js("// server");

    let result = StreamingServer::new(&h.ctx).start_with(None);

    assert!(matches!(result, Err(SupervisorError::RuntimeNotFound { .. })));
    assert!(h.host.exit_codes().is_empty());
}

#[cfg(unix)]
mod unix {
    use super::*;
    use std::time::Duration;
    use streamhost_core::ports::HostLifecycle;
    use streamhost_runtime::process::pid_exists;

    /// Running and not yet a zombie waiting to be reaped.
    fn is_live(pid: u32) -> bool {
        if !pid_exists(pid) {
            return false;
        }
        match std::fs::read_to_string(format!("/proc/{pid}/stat")) {
            Ok(stat) => !stat.contains(") Z"),
            Err(_) => true,
        }
    }

    async fn wait_until_gone(pid: u32) -> bool {
        for _ in 0..100 {
            if !is_live(pid) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        false
    }

    /// Runs `server.js` with `sh`, so the script can be a shell script.
    fn shell_harness(tmp: &std::path::Path, script: &str) -> Harness {
        let mut h = Harness::new(tmp, LINUX_X64, FakeCommands::nothing_installed());
        h.reconfigure(|c| c.node_binary = "sh".to_string());
        h.write_server_js(script);
        h
    }

    async fn read_log_eventually(path: &std::path::Path, needle: &str) -> String {
        for _ in 0..50 {
            if let Ok(contents) = std::fs::read_to_string(path)
                && contents.contains(needle)
            {
                return contents;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        std::fs::read_to_string(path).unwrap_or_default()
    }

    #[tokio::test]
    async fn output_is_appended_to_log_with_binary_env() {
        let tmp = tempfile::tempdir().unwrap();
        let h = shell_harness(
            tmp.path(),
            "echo \"ffmpeg=$FFMPEG_BIN\"\necho \"ffprobe=$FFPROBE_BIN\" >&2\n",
        );
        std::fs::write(h.ctx.paths.log_file_path(), "previous run\n").unwrap();

        let mut process = StreamingServer::new(&h.ctx).start().await.unwrap();
        assert!(process.pid() > 0);
        process.wait().await.unwrap();

        let expected = h.ctx.paths.binary_path(streamhost_core::BinaryKind::Ffprobe);
        let log = read_log_eventually(&h.ctx.paths.log_file_path(), "ffprobe=").await;
        assert!(log.starts_with("previous run\n"), "log: {log}");
        assert!(log.contains(&format!(
            "ffmpeg={}",
            h.ctx.paths.binary_path(streamhost_core::BinaryKind::Ffmpeg).display()
        )));
        assert!(log.contains(&format!("ffprobe={}", expected.display())));
        assert_eq!(h.host.hook_count(), 1);
    }

    #[tokio::test]
    async fn exit_hook_interrupts_the_server() {
        let tmp = tempfile::tempdir().unwrap();
        let h = shell_harness(tmp.path(), "exec sleep 30\n");

        let mut process = StreamingServer::new(&h.ctx).start().await.unwrap();
        // Host exit path: hooks signal the child
        h.host.exit(0);

        let status = tokio::time::timeout(Duration::from_secs(5), process.wait())
            .await
            .expect("server should stop after the exit hook")
            .unwrap();
        assert!(!status.success());
    }

    #[tokio::test]
    async fn explicit_shutdown_reaps_the_server() {
        let tmp = tempfile::tempdir().unwrap();
        let h = shell_harness(tmp.path(), "exec sleep 30\n");

        let mut process = StreamingServer::new(&h.ctx).start().await.unwrap();
        let pid = process.pid();
        let status = process.shutdown().await.unwrap();

        assert!(!status.success());
        assert!(!pid_exists(pid));
    }

    #[tokio::test]
    async fn dropped_handle_leaves_server_running_until_host_exit() {
        let tmp = tempfile::tempdir().unwrap();
        let h = shell_harness(tmp.path(), "exec sleep 30\n");

        let process = StreamingServer::new(&h.ctx).start().await.unwrap();
        let pid = process.pid();
        drop(process);

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(is_live(pid), "server should outlive its handle");

        h.host.run_exit_hooks();
        assert!(wait_until_gone(pid).await, "exit hook should stop the server");
    }
}
