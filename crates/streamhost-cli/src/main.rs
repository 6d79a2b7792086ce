use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use streamhost_cli::{Cli, CliError, CliOverrides, bootstrap, dispatch, signals};
use streamhost_core::ports::HostLifecycle;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn report(err: &anyhow::Error) -> ExitCode {
    eprintln!("❌ {err:#}");
    let code = err.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
    ExitCode::from(code)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables before clap reads its env fallbacks
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let overrides = CliOverrides::from(&cli);
    let Some(command) = cli.command else {
        return match Cli::command().print_help() {
            Ok(()) => ExitCode::SUCCESS,
            Err(_) => ExitCode::FAILURE,
        };
    };

    let ctx = match bootstrap(&overrides) {
        Ok(ctx) => ctx,
        Err(e) => return report(&e.into()),
    };

    let watcher = match signals::watch(ctx.shutdown.clone(), ctx.host.clone()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::warn!(error = %e, "Could not install signal handlers");
            None
        }
    };

    let result = dispatch(&ctx, command).await;
    if let Some(watcher) = watcher {
        watcher.abort();
    }
    ctx.host.run_exit_hooks();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}
