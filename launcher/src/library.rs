/// Steam library records: which library folder holds which AppId, and the
/// per-game manifest inside that folder.
///
/// `libraryfolders.vdf` is read once at startup into an immutable index.
/// `appmanifest_<appid>.acf` is only read for the single requested AppId.
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::LauncherError;
use crate::vdf::{self, Value};

/// Immutable AppId → library folder lookup built from `libraryfolders.vdf`.
#[derive(Debug)]
pub struct LibraryIndex {
    libraries: HashMap<u64, PathBuf>,
}

impl LibraryIndex {
    /// Reads and parses the library definition at `path`.
    ///
    /// Every child group of the document root contributes its `path` value
    /// for each numeric key under its `apps` sub-group. Children that are
    /// not groups, or lack `path`/`apps`, are skipped. Steam keeps library
    /// folders disjoint; if an AppId does show up twice, the last one wins.
    pub fn load(path: &Path) -> Result<Self, LauncherError> {
        let text =
            std::fs::read_to_string(path).map_err(|source| LauncherError::io(path, source))?;
        let doc = vdf::parse(&text).map_err(|source| LauncherError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;

        let mut libraries = HashMap::new();
        for (_, value) in doc.root.entries() {
            let Value::Group(folder) = value else {
                continue;
            };
            let Some(folder_path) = folder.get_str("path") else {
                continue;
            };
            let Some(apps) = folder.get_group("apps") else {
                continue;
            };
            for (app_key, _) in apps.entries() {
                if let Ok(app_id) = app_key.parse::<u64>() {
                    libraries.insert(app_id, PathBuf::from(folder_path));
                }
            }
        }
        Ok(Self { libraries })
    }

    /// The library folder containing `app_id`, if the game is installed.
    pub fn library_for(&self, app_id: u64) -> Option<&Path> {
        self.libraries.get(&app_id).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

/// The fields this tool needs from `appmanifest_<appid>.acf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameManifest {
    /// Directory name under `steamapps/common/`.
    pub install_dir: String,
    /// Display name of the game.
    pub name: String,
}

impl GameManifest {
    /// Reads the manifest for `app_id` inside `library`.
    pub fn load(library: &Path, app_id: u64) -> Result<Self, LauncherError> {
        let path = manifest_path(library, app_id);
        let text =
            std::fs::read_to_string(&path).map_err(|source| LauncherError::io(&path, source))?;
        let doc = vdf::parse(&text).map_err(|source| LauncherError::Malformed {
            path: path.clone(),
            source,
        })?;

        let field = |name: &'static str| {
            doc.root
                .get_str(name)
                .map(str::to_string)
                .ok_or(LauncherError::MissingField {
                    path: path.clone(),
                    field: name,
                })
        };
        Ok(Self {
            install_dir: field("installdir")?,
            name: field("name")?,
        })
    }
}

/// `<library>/steamapps/appmanifest_<appid>.acf`
pub fn manifest_path(library: &Path, app_id: u64) -> PathBuf {
    library
        .join("steamapps")
        .join(format!("appmanifest_{app_id}.acf"))
}

/// `<library>/steamapps/common/<installdir>`, the game's install root.
pub fn game_install_dir(library: &Path, install_dir: &str) -> PathBuf {
    library.join("steamapps").join("common").join(install_dir)
}
