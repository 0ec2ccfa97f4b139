/// Locates the Steam client installation.
///
/// On Windows the install root comes from `InstallPath` under the 32-bit
/// registry view of `HKLM\SOFTWARE\Valve\Steam`, the value the Steam
/// installer writes. On other platforms the well-known per-user directories
/// are probed (native, symlinked, Flatpak).
///
/// Discovery also distinguishes "Steam is not here at all" from "Steam is
/// installed but was never run": a client that has never started has no
/// `libraryfolders.vdf` yet.
use std::path::PathBuf;

use crate::error::LauncherError;

pub struct SteamInstall {
    root: PathBuf,
}

impl SteamInstall {
    /// Finds the Steam installation and verifies it has been initialized.
    pub fn discover() -> Result<Self, LauncherError> {
        let root = imp::install_root().ok_or(LauncherError::ClientNotFound)?;
        let install = Self { root };
        if !install.client_binary().is_file() {
            return Err(LauncherError::ClientNotFound);
        }
        if !install.library_definition().is_file() {
            return Err(LauncherError::ClientUninitialized);
        }
        Ok(install)
    }

    #[cfg(windows)]
    pub fn client_binary(&self) -> PathBuf {
        self.root.join("steam.exe")
    }

    #[cfg(not(windows))]
    pub fn client_binary(&self) -> PathBuf {
        self.root.join("steam.sh")
    }

    /// `steamapps/libraryfolders.vdf`, written on first client start.
    pub fn library_definition(&self) -> PathBuf {
        self.root.join("steamapps").join("libraryfolders.vdf")
    }
}

// ── Windows implementation ─────────────────────────────────────────────────────

#[cfg(windows)]
mod imp {
    use std::path::PathBuf;

    use windows::core::PCWSTR;
    use windows::Win32::Foundation::ERROR_SUCCESS;
    use windows::Win32::System::Registry::{
        RegCloseKey, RegOpenKeyExW, RegQueryValueExW, HKEY, HKEY_LOCAL_MACHINE, KEY_QUERY_VALUE,
        KEY_WOW64_32KEY, REG_EXPAND_SZ, REG_SZ, REG_VALUE_TYPE,
    };

    const STEAM_KEY: &str = r"SOFTWARE\Valve\Steam";
    const VALUE_NAME: &str = "InstallPath";

    /// Converts a Rust `&str` to a null-terminated UTF-16 `Vec<u16>`.
    fn to_wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    /// Reads `InstallPath` from the 32-bit view of `HKLM\SOFTWARE\Valve\Steam`.
    /// Any failure (key absent, value absent, wrong value type) means Steam
    /// is not installed as far as this tool is concerned.
    pub fn install_root() -> Option<PathBuf> {
        let key_w = to_wide(STEAM_KEY);
        let val_w = to_wide(VALUE_NAME);

        let mut hkey = HKEY::default();
        let err = unsafe {
            RegOpenKeyExW(
                HKEY_LOCAL_MACHINE,
                PCWSTR::from_raw(key_w.as_ptr()),
                0,
                KEY_QUERY_VALUE | KEY_WOW64_32KEY,
                &mut hkey,
            )
        };
        if err != ERROR_SUCCESS {
            return None;
        }

        let result = unsafe { read_string_value(hkey, PCWSTR::from_raw(val_w.as_ptr())) };
        unsafe {
            let _ = RegCloseKey(hkey);
        };
        result.map(PathBuf::from)
    }

    unsafe fn read_string_value(hkey: HKEY, name: PCWSTR) -> Option<String> {
        let mut value_type = REG_VALUE_TYPE::default();
        let mut len: u32 = 0;
        let err = RegQueryValueExW(hkey, name, None, Some(&mut value_type), None, Some(&mut len));
        if err != ERROR_SUCCESS || len == 0 {
            return None;
        }

        let mut buf = vec![0u8; len as usize];
        let err = RegQueryValueExW(
            hkey,
            name,
            None,
            Some(&mut value_type),
            Some(buf.as_mut_ptr()),
            Some(&mut len),
        );
        if err != ERROR_SUCCESS {
            return None;
        }
        if value_type != REG_SZ && value_type != REG_EXPAND_SZ {
            return None;
        }

        let wide: Vec<u16> = buf[..len as usize]
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        let end = wide.iter().position(|&c| c == 0).unwrap_or(wide.len());
        let path = String::from_utf16_lossy(&wide[..end]);
        (!path.is_empty()).then_some(path)
    }
}

// ── Unix implementation ────────────────────────────────────────────────────────

#[cfg(not(windows))]
mod imp {
    use std::path::PathBuf;

    /// Probes the usual per-user Steam locations: native, the `~/.steam`
    /// symlink farm, and the Flatpak sandbox.
    pub fn install_root() -> Option<PathBuf> {
        let home = PathBuf::from(std::env::var_os("HOME")?);
        [
            home.join(".local/share/Steam"),
            home.join(".steam/steam"),
            home.join(".var/app/com.valvesoftware.Steam/.local/share/Steam"),
        ]
        .into_iter()
        .find(|candidate| candidate.join("steamapps").is_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn library_definition_is_under_steamapps() {
        let install = SteamInstall {
            root: PathBuf::from("/opt/steam"),
        };
        assert_eq!(
            install.library_definition(),
            Path::new("/opt/steam/steamapps/libraryfolders.vdf")
        );
    }

    #[test]
    fn client_binary_is_under_the_root() {
        let install = SteamInstall {
            root: PathBuf::from("/opt/steam"),
        };
        assert_eq!(install.client_binary().parent(), Some(Path::new("/opt/steam")));
    }
}
