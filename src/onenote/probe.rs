//! Locating the installed OneNote executable.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::config::OneNoteConfig;
use crate::onenote::dependencies::ExecutableLocator;
use crate::util::expand_tilde;

static SHARED_PROBE: OnceLock<Arc<AvailabilityProbe>> = OnceLock::new();

/// Resolves the executable path once and answers whether the integration is usable.
pub struct AvailabilityProbe {
    executable_name: String,
    locator: Arc<dyn ExecutableLocator>,
    resolved: OnceLock<Option<PathBuf>>,
}

impl AvailabilityProbe {
    pub fn new(executable_name: impl Into<String>, locator: Arc<dyn ExecutableLocator>) -> Self {
        Self {
            executable_name: executable_name.into(),
            locator,
            resolved: OnceLock::new(),
        }
    }

    /// The process-wide probe.
    ///
    /// The first caller's configuration decides how the executable is looked up;
    /// later calls reuse that probe.
    pub fn shared(config: &OneNoteConfig) -> Arc<Self> {
        SHARED_PROBE
            .get_or_init(|| {
                Arc::new(Self::new(
                    config.executable_name.clone(),
                    Arc::new(SearchPathLocator::from_config(config)),
                ))
            })
            .clone()
    }

    /// Path of the installed executable, resolved on first use.
    pub fn executable_path(&self) -> Option<&Path> {
        self.resolved
            .get_or_init(|| resolve_executable_path(self.locator.as_ref(), &self.executable_name))
            .as_deref()
    }

    /// `base_active` and the executable is installed.
    pub fn is_active(&self, base_active: bool) -> bool {
        base_active && self.executable_path().is_some()
    }
}

/// Look up `name` and drop the result unless the file is actually there.
pub fn resolve_executable_path(locator: &dyn ExecutableLocator, name: &str) -> Option<PathBuf> {
    let Some(path) = locator.find_executable(name) else {
        log::debug!("{} not found", name);
        return None;
    };

    if path.is_file() {
        log::debug!("Resolved {} to {}", name, path.display());
        Some(path)
    } else {
        log::debug!(
            "{} was reported at {} but the file does not exist",
            name,
            path.display()
        );
        None
    }
}

/// Finds an executable in an explicit location, configured directories, then `PATH`.
pub struct SearchPathLocator {
    explicit: Option<PathBuf>,
    search_dirs: Vec<PathBuf>,
    use_path_env: bool,
}

impl SearchPathLocator {
    pub fn new(explicit: Option<PathBuf>, search_dirs: Vec<PathBuf>, use_path_env: bool) -> Self {
        Self {
            explicit,
            search_dirs,
            use_path_env,
        }
    }

    pub fn from_config(config: &OneNoteConfig) -> Self {
        let expand = |path: &PathBuf| expand_tilde(&path.to_string_lossy());
        Self::new(
            config.executable_path.as_ref().map(expand),
            config.search_dirs.iter().map(expand).collect(),
            true,
        )
    }

    fn path_dirs(&self) -> Vec<PathBuf> {
        if !self.use_path_env {
            return Vec::new();
        }
        env::var_os("PATH")
            .map(|paths| env::split_paths(&paths).collect())
            .unwrap_or_default()
    }
}

impl ExecutableLocator for SearchPathLocator {
    fn find_executable(&self, name: &str) -> Option<PathBuf> {
        if let Some(explicit) = &self.explicit {
            return Some(explicit.clone());
        }

        self.search_dirs
            .iter()
            .cloned()
            .chain(self.path_dirs())
            .find_map(|dir| find_in_dir(&dir, name))
    }
}

/// Case-insensitive file name lookup inside one directory.
fn find_in_dir(dir: &Path, name: &str) -> Option<PathBuf> {
    let exact = dir.join(name);
    if exact.is_file() {
        return Some(exact);
    }

    fs::read_dir(dir)
        .ok()?
        .filter_map(Result::ok)
        .find(|entry| {
            entry.file_name().to_string_lossy().eq_ignore_ascii_case(name)
                && entry.path().is_file()
        })
        .map(|entry| entry.path())
}
