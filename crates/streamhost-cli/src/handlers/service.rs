//! `service`: inspect and control the external streaming service.

use anyhow::Result;
use streamhost_runtime::service::{TERMINATE_NOT_FOUND, TERMINATE_SIGNALLED};
use streamhost_runtime::{ServiceInstaller, ServiceLocator};

use crate::bootstrap::CliContext;
use crate::commands::ServiceCommand;
use crate::error::CliError;

pub async fn execute(ctx: &CliContext, command: ServiceCommand) -> Result<()> {
    let locator = ServiceLocator::new(&ctx.provision);
    match command {
        ServiceCommand::Status { json } => {
            let record = locator.record().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                println!("installed = {}", record.installed);
                println!("running   = {}", record.running);
                match &record.executable_path {
                    Some(path) => println!("executable = {}", path.display()),
                    None => println!("executable = (not found)"),
                }
            }
        }
        ServiceCommand::Install => {
            let installed = ServiceInstaller::new(&ctx.provision)
                .download_and_install(&ctx.shutdown)
                .await;
            if !installed {
                return Err(CliError::Provision("Stremio Service installation failed".to_string()).into());
            }
            println!("✅ Stremio Service installed and running");
        }
        ServiceCommand::Start => {
            let Some(executable) = locator.find_executable().await else {
                return Err(CliError::Provision(
                    "Stremio Service is not installed; run `streamhost service install`".to_string(),
                )
                .into());
            };
            let pid = locator
                .start(&executable)
                .map_err(|e| CliError::Provision(e.to_string()))?;
            match pid {
                Some(pid) => println!("✅ Stremio Service started (pid {pid})"),
                None => println!("✅ Stremio Service started"),
            }
        }
        ServiceCommand::Terminate => match locator.terminate().await {
            TERMINATE_SIGNALLED => println!("Stremio Service terminated"),
            TERMINATE_NOT_FOUND => {
                return Err(CliError::Provision("Stremio Service is not running".to_string()).into());
            }
            _ => {
                return Err(CliError::Provision("Stremio Service could not be terminated".to_string()).into());
            }
        },
        ServiceCommand::CheckUpdate => match ServiceInstaller::new(&ctx.provision).check_for_update().await {
            Some(tag) => println!("Update available: {tag}"),
            None => println!("Stremio Service is up to date (or not installed by streamhost)"),
        },
    }
    Ok(())
}
