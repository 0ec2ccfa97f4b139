mod config;
mod console;
mod error;
mod executable;
mod interrupt;
mod launch;
mod library;
mod monitor;
mod paths;
mod steam;
mod vdf;

use std::sync::Arc;

use tokio::sync::watch;

use crate::error::LauncherError;
use crate::interrupt::SessionState;
use crate::library::{GameManifest, LibraryIndex};
use crate::monitor::{MonitorOptions, Outcome, SystemProcessQuery};
use crate::steam::SteamInstall;

#[tokio::main]
async fn main() {
    // ── Arguments ─────────────────────────────────────────────────────────────
    // `<appId> [executableName]`, positional, no flags.
    let (app_id, executable_name) = match parse_args(std::env::args().skip(1)) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{e}");
            return;
        }
    };

    // Get the console window out of the captured desktop before anything
    // shows up on the stream.
    console::minimize_console_window();

    // ── Configuration ─────────────────────────────────────────────────────────
    let config = match paths::config_file_path() {
        Some(path) => config::load_or_default(&path).unwrap_or_else(|e| {
            eprintln!("[config] Error (using defaults): {e:#}");
            config::Config::default()
        }),
        None => config::Config::default(),
    };

    // ── Cancellation ──────────────────────────────────────────────────────────
    let session = Arc::new(SessionState::new());
    let (cancel_tx, cancel_rx) = watch::channel(false);
    interrupt::spawn_interrupt_handler(
        Arc::clone(&session),
        cancel_tx,
        config.cancel_escalation(),
    );

    match run(app_id, executable_name, &config, &session, cancel_rx).await {
        Ok(Outcome::Completed) => {
            println!("Exiting steam game launcher to stop the streaming session...");
        }
        Ok(Outcome::Cancelled) => {
            println!("Cancelled; exiting without waiting for the game.");
        }
        // One explanatory line, no stack trace, normal return.
        Err(e) => eprintln!("{e}"),
    }
}

fn parse_args(
    mut args: impl Iterator<Item = String>,
) -> Result<(u64, Option<String>), LauncherError> {
    let raw_id = args.next().ok_or(LauncherError::MissingAppId)?;
    let app_id = match raw_id.parse::<u64>() {
        Ok(id) if id > 0 => id,
        _ => return Err(LauncherError::InvalidAppId(raw_id)),
    };
    Ok((app_id, args.next()))
}

/// Resolve, trigger, await. Everything before the trigger is plain data
/// lookup; everything after is the monitor's business.
async fn run(
    app_id: u64,
    executable_name: Option<String>,
    config: &config::Config,
    session: &SessionState,
    cancel_rx: watch::Receiver<bool>,
) -> Result<Outcome, LauncherError> {
    let steam = SteamInstall::discover()?;
    let index = LibraryIndex::load(&steam.library_definition())?;
    let library_path = index
        .library_for(app_id)
        .ok_or(LauncherError::GameNotInstalled(app_id))?;

    let manifest = GameManifest::load(library_path, app_id)?;
    let game_dir = library::game_install_dir(library_path, &manifest.install_dir);

    let executable = executable::resolve(&game_dir, executable_name.as_deref())?;
    let base_name = executable::process_base_name(&executable)
        .ok_or_else(|| LauncherError::NoExecutableFound(game_dir.clone()))?;

    println!("Launching game: {}", manifest.name);
    launch::trigger(app_id)?;
    session.mark_engaged();

    println!("Watching for game process: {base_name}");
    let options = MonitorOptions {
        grace: config.grace(),
        poll_interval: config.poll_interval(),
    };
    Ok(monitor::await_drain(SystemProcessQuery::new(), &base_name, options, cancel_rx).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    // ── parse_args ────────────────────────────────────────────────────────────

    #[test]
    fn parse_args_requires_an_app_id() {
        assert!(matches!(
            parse_args(args(&[])),
            Err(LauncherError::MissingAppId)
        ));
    }

    #[test]
    fn parse_args_rejects_non_numeric_id() {
        assert!(matches!(
            parse_args(args(&["portal2"])),
            Err(LauncherError::InvalidAppId(_))
        ));
    }

    #[test]
    fn parse_args_rejects_negative_and_zero_ids() {
        assert!(matches!(
            parse_args(args(&["-440"])),
            Err(LauncherError::InvalidAppId(_))
        ));
        assert!(matches!(
            parse_args(args(&["0"])),
            Err(LauncherError::InvalidAppId(_))
        ));
    }

    #[test]
    fn parse_args_accepts_id_alone() {
        let (id, exe) = parse_args(args(&["440"])).unwrap();
        assert_eq!(id, 440);
        assert!(exe.is_none());
    }

    #[test]
    fn parse_args_accepts_explicit_executable() {
        let (id, exe) = parse_args(args(&["440", "bin/hl2.exe"])).unwrap();
        assert_eq!(id, 440);
        assert_eq!(exe.as_deref(), Some("bin/hl2.exe"));
    }
}
