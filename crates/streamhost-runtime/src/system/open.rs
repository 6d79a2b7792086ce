//! Hand a folder or URL to the desktop's default handler.

use streamhost_core::platform::Os;
use streamhost_core::ports::{CommandError, CommandRunner, ExternalCommand};

/// The command that opens `target` (a path or URL) with the default handler.
pub fn open_command(os: Os, target: &str) -> ExternalCommand {
    let program = match os {
        Os::Win32 => "explorer",
        Os::Darwin => "open",
        Os::Linux => "xdg-open",
    };
    ExternalCommand::new(program).arg(target)
}

/// Open `target` without waiting for the handler to exit.
pub fn open_detached(
    commands: &dyn CommandRunner,
    os: Os,
    target: &str,
) -> Result<(), CommandError> {
    commands.spawn_detached(&open_command(os, target)).map(|_| ())
}
