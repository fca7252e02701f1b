//! Location of the on-disk flow store.

use std::path::PathBuf;

/// Resolves where flow documents are stored.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// If `None`, use the OS default data directory.
    pub data_override: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        // FLOW_BUILDER_DATA overrides everything, for tests and packaging.
        let data_override = std::env::var_os("FLOW_BUILDER_DATA").map(PathBuf::from);
        Self { data_override }
    }
}

impl StoreConfig {
    /// A config pinned to an explicit directory.
    pub fn at(dir: PathBuf) -> Self {
        Self {
            data_override: Some(dir),
        }
    }

    fn default_data_dir() -> PathBuf {
        // Cross-platform user-writable data dir
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("~"));
            return home
                .join("Library")
                .join("Application Support")
                .join("flow-builder");
        }
        #[cfg(target_os = "windows")]
        {
            if let Ok(appdata) = std::env::var("APPDATA") {
                return PathBuf::from(appdata).join("flow-builder");
            }
            return PathBuf::from("flow-builder");
        }
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            // $XDG_DATA_HOME/flow-builder or ~/.local/share/flow-builder
            if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
                return PathBuf::from(xdg).join("flow-builder");
            }
            if let Ok(home) = std::env::var("HOME") {
                return PathBuf::from(home)
                    .join(".local")
                    .join("share")
                    .join("flow-builder");
            }
            PathBuf::from("/tmp").join("flow-builder")
        }
    }

    /// Effective directory holding the per-flow JSON documents.
    pub fn flows_dir(&self) -> PathBuf {
        match &self.data_override {
            Some(p) => p.clone(),
            None => Self::default_data_dir().join("flows"),
        }
    }
}
