/// Operator cancellation (Ctrl+C) with a two-tier escalation policy.
///
/// Before the launch has been handed to Steam there is nothing graceful to
/// unwind, so an interrupt simply exits. Once engaged, the first interrupt
/// requests cooperative cancellation (the monitor notices within one poll
/// interval and unwinds); a second interrupt, or a cooperative path that
/// stalls past the escalation timeout, forces the exit. The tool must stay
/// interruptible even if an OS wait it depends on is not.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

pub const DEFAULT_ESCALATION: Duration = Duration::from_secs(5);

/// Where the session currently is, shared between `main` and the interrupt
/// handler. Replaces the ambient "is started" global the tool would
/// otherwise grow.
#[derive(Default)]
pub struct SessionState {
    engaged: AtomicBool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks that the launch was triggered and the monitor is (about to be)
    /// watching. From here on, cancellation is cooperative first.
    pub fn mark_engaged(&self) {
        self.engaged.store(true, Ordering::Release);
    }

    pub fn engaged(&self) -> bool {
        self.engaged.load(Ordering::Acquire)
    }
}

/// Spawns the Ctrl+C listener. `cancel` is the single-shot cooperative
/// cancellation channel the monitor subscribes to.
pub fn spawn_interrupt_handler(
    state: Arc<SessionState>,
    cancel: watch::Sender<bool>,
    escalation: Duration,
) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            eprintln!("[interrupt] Failed to listen for Ctrl+C; cancellation unavailable");
            return;
        }

        if !state.engaged() {
            // Pre-launch: nothing is being tracked, exit outright.
            std::process::exit(1);
        }

        eprintln!("[interrupt] Ctrl+C received; stopping the game watch...");
        let _ = cancel.send(true);

        // Escalation: a second Ctrl+C, or a cooperative path that never
        // resolves, must still end the process.
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = tokio::time::sleep(escalation) => {
                eprintln!("[interrupt] Cancellation did not resolve in time; forcing exit");
            }
        }
        std::process::exit(1);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_starts_disengaged() {
        let state = SessionState::new();
        assert!(!state.engaged());
    }

    #[test]
    fn mark_engaged_is_sticky() {
        let state = SessionState::new();
        state.mark_engaged();
        state.mark_engaged();
        assert!(state.engaged());
    }

    #[test]
    fn engaged_flag_is_visible_across_threads() {
        let state = Arc::new(SessionState::new());
        let writer = Arc::clone(&state);
        std::thread::spawn(move || writer.mark_engaged())
            .join()
            .unwrap();
        assert!(state.engaged());
    }
}
