/// Profile paths for this tool.
///
/// The only file that lives here is the optional `config.toml`:
///   - Windows: %APPDATA%\SunshineSteamLauncher\config.toml
///   - elsewhere: $XDG_CONFIG_HOME/sunshine-steam-launcher/config.toml
///     (falling back to ~/.config)
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[cfg(windows)]
const APP_DIR_NAME: &str = "SunshineSteamLauncher";
#[cfg(not(windows))]
const APP_DIR_NAME: &str = "sunshine-steam-launcher";

/// The tool's profile directory, or `None` when the platform's profile
/// environment is missing. A one-shot launcher treats that as "no config".
pub fn profile_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        std::env::var_os("APPDATA").map(|appdata| PathBuf::from(appdata).join(APP_DIR_NAME))
    }
    #[cfg(not(windows))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg).join(APP_DIR_NAME));
        }
        std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".config").join(APP_DIR_NAME))
    }
}

pub fn config_file_path() -> Option<PathBuf> {
    profile_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}
