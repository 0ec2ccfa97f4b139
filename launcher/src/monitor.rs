/// The launch-and-await core: watches the OS process table for the game and
/// resolves once every matching process has exited.
///
/// Launching through Steam is indirect (URI dispatch, then the client, then
/// the spawn), so the game's absence right after the trigger means nothing.
/// Absence only becomes meaningful once a grace window has elapsed. After
/// the first sighting the monitor keeps listening for further instances
/// (launchers and games often share a base name, and titles relaunch
/// themselves) until everything it has seen is gone and nothing new shows
/// up.
use std::collections::HashSet;
use std::time::Duration;

use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, sleep, Instant};

pub const DEFAULT_GRACE: Duration = Duration::from_secs(10);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How the wait ended. `Cancelled` is an outcome, not an error: the operator
/// asked to stop, and the monitor abandoned its exit-waits without blocking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy)]
pub struct MonitorOptions {
    /// How long process absence is tolerated before it means "never started
    /// or already gone".
    pub grace: Duration,
    /// Cadence of process-table snapshots and exit probes.
    pub poll_interval: Duration,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            grace: DEFAULT_GRACE,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Process-table access as the monitor needs it. The production
/// implementation is [`SystemProcessQuery`]; tests script their own.
///
/// Matching is by base name only, with no executable-path or parent-process
/// verification, so an unrelated process that happens to share the game's
/// name will be tracked too. Known limitation, accepted here.
pub trait ProcessQuery: Clone + Send + 'static {
    /// Pids of all processes whose name matches `base_name`,
    /// case-insensitively and ignoring any extension. An `Err` is a
    /// transient condition: the caller treats it as "no match this tick".
    fn pids_matching(&mut self, base_name: &str) -> std::io::Result<Vec<u32>>;

    /// Whether `pid` is still in the process table.
    fn is_running(&mut self, pid: u32) -> bool;
}

/// [`ProcessQuery`] over the live OS process table via `sysinfo`.
pub struct SystemProcessQuery {
    sys: System,
}

impl SystemProcessQuery {
    pub fn new() -> Self {
        Self { sys: System::new() }
    }
}

impl Default for SystemProcessQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SystemProcessQuery {
    /// Snapshot state is per-instance; a clone starts with a fresh, empty
    /// `System` of its own.
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl ProcessQuery for SystemProcessQuery {
    fn pids_matching(&mut self, base_name: &str) -> std::io::Result<Vec<u32>> {
        self.sys.refresh_processes(ProcessesToUpdate::All, true);
        Ok(self
            .sys
            .processes()
            .iter()
            .filter(|(_, process)| name_matches(&process.name().to_string_lossy(), base_name))
            .map(|(pid, _)| pid.as_u32())
            .collect())
    }

    fn is_running(&mut self, pid: u32) -> bool {
        let pid = Pid::from_u32(pid);
        self.sys.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
        self.sys.process(pid).is_some()
    }
}

/// Case-insensitive, extension-agnostic process-name comparison:
/// `hl2.exe`, `HL2.EXE` and `hl2` all match base name `hl2`.
fn name_matches(process_name: &str, base_name: &str) -> bool {
    let stem = std::path::Path::new(process_name)
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    stem.to_lowercase() == base_name.to_lowercase()
}

/// Waits until every process matching `base_name` has exited, or until
/// cancellation.
///
/// Single polling loop at a fixed cadence; the loop is the only owner of the
/// tracked set. Each newly sighted pid gets its own exit-wait task, which
/// reports the observed exit back over a channel and never touches shared
/// state. A pid leaves the tracked set only through such a report, never
/// because a snapshot missed it.
///
/// Returns [`Outcome::Completed`] once a snapshot matches nothing, nothing
/// is tracked, and the grace deadline has passed. Until that deadline an
/// empty table keeps the monitor waiting, even if earlier instances already
/// came and went.
pub async fn await_drain<Q: ProcessQuery>(
    mut query: Q,
    base_name: &str,
    options: MonitorOptions,
    mut cancel: watch::Receiver<bool>,
) -> Outcome {
    let deadline = Instant::now() + options.grace;
    let mut ticker = interval(options.poll_interval);
    let (exited_tx, mut exited_rx) = mpsc::channel::<u32>(32);
    let mut tracked: HashSet<u32> = HashSet::new();

    loop {
        tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => return Outcome::Cancelled,
            _ = ticker.tick() => {}
        }

        while let Ok(pid) = exited_rx.try_recv() {
            if tracked.remove(&pid) {
                println!("[monitor] Process {pid} exited.");
            }
        }

        let matches = match query.pids_matching(base_name) {
            Ok(pids) => pids,
            Err(e) => {
                eprintln!("[monitor] Process snapshot failed (retrying): {e}");
                Vec::new()
            }
        };

        for &pid in &matches {
            if tracked.insert(pid) {
                println!("[monitor] Found game process {base_name} (pid {pid}). Waiting for it to exit...");
                tokio::spawn(wait_for_exit(
                    query.clone(),
                    pid,
                    options.poll_interval,
                    cancel.clone(),
                    exited_tx.clone(),
                ));
            }
        }

        if tracked.is_empty() && matches.is_empty() && Instant::now() >= deadline {
            return Outcome::Completed;
        }
    }
}

/// Resolves once `pid` leaves the process table, reporting it on `exited`.
/// Cancellation abandons the wait without reporting.
async fn wait_for_exit<Q: ProcessQuery>(
    mut query: Q,
    pid: u32,
    poll_interval: Duration,
    mut cancel: watch::Receiver<bool>,
    exited: mpsc::Sender<u32>,
) {
    loop {
        if !query.is_running(pid) {
            let _ = exited.send(pid).await;
            return;
        }
        tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => return,
            _ = sleep(poll_interval) => {}
        }
    }
}

/// Pends until cancellation is requested. A dropped sender counts as
/// cancellation so nothing here can wait forever on a dead channel.
async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    let _ = cancel.wait_for(|&cancelled| cancelled).await;
}
