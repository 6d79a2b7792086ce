//! End-to-end dispatch against a throwaway data directory.
//!
//! Only commands that stay offline are exercised here.

use streamhost_cli::{CliError, CliOverrides, Commands, ServerCommand, bootstrap, dispatch};

fn overrides(dir: &tempfile::TempDir) -> CliOverrides {
    CliOverrides {
        data_dir: Some(dir.path().join("data")),
        non_interactive: true,
        ..CliOverrides::default()
    }
}

#[tokio::test]
async fn paths_command_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = bootstrap(&overrides(&dir)).unwrap();
    dispatch(&ctx, Commands::Paths { json: true }).await.unwrap();
    assert_eq!(ctx.provision.config.data_dir, dir.path().join("data"));
}

#[tokio::test]
async fn ensure_without_server_js_reports_provision_error() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = bootstrap(&overrides(&dir)).unwrap();

    let err = dispatch(&ctx, Commands::Ensure).await.unwrap_err();
    let cli_err = err.downcast_ref::<CliError>().expect("CliError");
    assert_eq!(cli_err.exit_code(), 1);
    assert!(err.to_string().contains("server.js"));

    // Provisioning creates the directory even when the script is missing
    assert!(dir.path().join("data").join("streamingserver").is_dir());
}

#[tokio::test]
async fn server_status_reports_without_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = bootstrap(&overrides(&dir)).unwrap();
    dispatch(
        &ctx,
        Commands::Server {
            command: ServerCommand::Status,
        },
    )
    .await
    .unwrap();
    assert!(!dir.path().join("data").join("streamingserver").exists());
}

#[tokio::test]
async fn server_start_without_script_fails_before_spawning() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = bootstrap(&overrides(&dir)).unwrap();
    let err = dispatch(
        &ctx,
        Commands::Server {
            command: ServerCommand::Start,
        },
    )
    .await
    .unwrap_err();
    assert!(err.downcast_ref::<CliError>().is_some());
    assert_eq!(ctx.host.hook_count(), 0);
}
