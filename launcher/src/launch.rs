/// Hands the launch request to the Steam client through the platform URI
/// dispatcher.
///
/// This is fire-and-forget: a successful spawn means the OS accepted the
/// URI, not that the game will start. Steam may show dialogs, update the
/// game first, or do nothing at all; the process watch in [`crate::monitor`]
/// absorbs that uncertainty.
use std::process::Command;

use crate::error::LauncherError;

/// `steam://launch/<appid>/dialog`: launch the app, letting Steam show any
/// launch-option dialog it wants to.
pub fn launch_uri(app_id: u64) -> String {
    format!("steam://launch/{app_id}/dialog")
}

pub fn trigger(app_id: u64) -> Result<(), LauncherError> {
    let child = uri_dispatch_command()
        .arg(launch_uri(app_id))
        .spawn()
        .map_err(|source| LauncherError::LaunchFailed { source })?;

    // The dispatcher exits almost immediately; reap it off to the side so it
    // doesn't linger as a zombie while we wait on the game.
    std::thread::spawn(move || {
        let mut child = child;
        let _ = child.wait();
    });
    Ok(())
}

/// `explorer.exe` resolves registered URI protocols without blocking on the
/// handler, which is exactly the behavior a fire-and-forget trigger needs.
#[cfg(windows)]
fn uri_dispatch_command() -> Command {
    use std::path::PathBuf;

    let explorer = std::env::var_os("WINDIR")
        .map(|windir| PathBuf::from(windir).join("explorer.exe"))
        .unwrap_or_else(|| PathBuf::from("explorer.exe"));
    Command::new(explorer)
}

#[cfg(not(windows))]
fn uri_dispatch_command() -> Command {
    Command::new("xdg-open")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_uri_has_dialog_form() {
        assert_eq!(launch_uri(440), "steam://launch/440/dialog");
    }

    #[test]
    fn launch_uri_carries_large_app_ids() {
        assert_eq!(launch_uri(1091500), "steam://launch/1091500/dialog");
    }
}
