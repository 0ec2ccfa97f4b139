/// Picks the executable to treat as "the game" inside an install root.
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::LauncherError;

/// Directory levels to descend when scanning for an executable.
const MAX_SCAN_DEPTH: usize = 30;

/// Resolves the game executable.
///
/// An explicit `name` is authoritative: it is joined to the install root
/// (absolute names are kept as-is) and never existence-checked. If it is
/// wrong, the process watch simply drains at the grace deadline.
///
/// Without a name, the install root is scanned recursively (up to
/// [`MAX_SCAN_DEPTH`] levels, unreadable entries skipped) and the first
/// executable in enumeration order wins. That order is
/// filesystem-dependent, so this is best-effort "main executable" detection,
/// not a guarantee; the explicit second argument is the escape hatch.
pub fn resolve(install_root: &Path, name: Option<&str>) -> Result<PathBuf, LauncherError> {
    if let Some(name) = name {
        let hint = Path::new(name);
        return Ok(if hint.is_absolute() {
            hint.to_path_buf()
        } else {
            install_root.join(hint)
        });
    }

    for entry in WalkDir::new(install_root)
        .max_depth(MAX_SCAN_DEPTH)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if entry.file_type().is_file() && is_executable(entry.path()) {
            return Ok(entry.into_path());
        }
    }
    Err(LauncherError::NoExecutableFound(install_root.to_path_buf()))
}

/// The executable's file name without extension, the key used to match
/// entries in the OS process table.
pub fn process_base_name(executable: &Path) -> Option<String> {
    executable
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
}

#[cfg(windows)]
fn is_executable(path: &Path) -> bool {
    has_exe_extension(path)
}

/// Steam libraries on Linux mix native binaries with Proton-run `.exe`s, so
/// either an execute bit or the Windows extension counts.
#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    if has_exe_extension(path) {
        return true;
    }
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

fn has_exe_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("exe"))
}
