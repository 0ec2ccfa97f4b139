use std::path::PathBuf;

use crate::vdf::VdfError;

/// All fatal, user-facing conditions the launcher can hit.
///
/// Each variant renders as a single explanatory line; `main` prints it to
/// stderr and returns without a stack trace. Transient conditions (a failed
/// process-table snapshot, a bad config file) are handled where they occur
/// and never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum LauncherError {
    #[error("Please specify an AppId as the first launch argument of this tool.")]
    MissingAppId,

    #[error("\"{0}\" is not a valid AppId; AppIds are positive numbers. Please specify an AppId as the first launch argument of this tool.")]
    InvalidAppId(String),

    #[error("Cannot find Steam on this machine. Please install the Steam client, or run it at least once, before using this tool.")]
    ClientNotFound,

    #[error("Steam is installed but has never been initialized. Please run the Steam client at least once before using this tool.")]
    ClientUninitialized,

    #[error("App {0} is not installed on this computer. Please install the game through the Steam client.")]
    GameNotInstalled(u64),

    #[error("Could not determine the game's main executable under {}. Please specify the executable file name as the second launch argument.", .0.display())]
    NoExecutableFound(PathBuf),

    #[error("Failed to read {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Steam data file {} is malformed: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: VdfError,
    },

    #[error("Steam data file {} is missing the \"{field}\" field", .path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("Failed to hand the launch request to Steam: {source}")]
    LaunchFailed {
        #[source]
        source: std::io::Error,
    },
}

impl LauncherError {
    /// Wraps an I/O error with the path it happened on.
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            context: path.display().to_string(),
            source,
        }
    }
}
