//! Cached destination icons extracted from the OneNote executable.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use thiserror::Error;

use crate::capture::CaptureError;
use crate::destination::DisplayIcon;
use crate::onenote::dependencies::IconSource;

static SHARED_CACHE: OnceLock<Arc<IconCache>> = OnceLock::new();

/// Display scale (in percent) above which the high resolution icon is used.
pub const HIGH_RES_DPI_THRESHOLD: f64 = 100.0;

/// Errors that can occur while loading an icon.
#[derive(Debug, Error)]
pub enum IconError {
    #[error("Icon extraction failed: {0}")]
    Extraction(String),

    #[error("Icon is not a valid image: {0}")]
    InvalidImage(#[from] CaptureError),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct IconKey {
    path: PathBuf,
    index: u32,
    high_res: bool,
}

/// Icons keyed by executable, resource index and resolution tier.
///
/// Loaded icons are kept for the lifetime of the cache. Failed loads are not
/// cached so a later call can retry.
pub struct IconCache {
    source: Arc<dyn IconSource>,
    icons: RwLock<HashMap<IconKey, Arc<DisplayIcon>>>,
}

impl IconCache {
    pub fn new(source: Arc<dyn IconSource>) -> Self {
        Self {
            source,
            icons: RwLock::new(HashMap::new()),
        }
    }

    /// The process-wide cache. `source` is only used by the first caller.
    pub fn shared(source: Arc<dyn IconSource>) -> Arc<Self> {
        SHARED_CACHE
            .get_or_init(|| Arc::new(Self::new(source)))
            .clone()
    }

    pub fn get(&self, path: &Path, index: u32, high_res: bool) -> Option<Arc<DisplayIcon>> {
        let key = IconKey {
            path: path.to_path_buf(),
            index,
            high_res,
        };

        // The map is only ever inserted into, so a poisoned lock still holds valid entries.
        if let Some(icon) = self
            .icons
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Some(Arc::clone(icon));
        }

        // Two threads may both load the same icon here; the second insert wins.
        match self.source.load(path, index, high_res) {
            Ok(icon) => {
                log::debug!(
                    "Loaded {}x{} icon {} from {}",
                    icon.width,
                    icon.height,
                    index,
                    path.display()
                );
                let icon = Arc::new(icon);
                self.icons
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(key, Arc::clone(&icon));
                Some(icon)
            }
            Err(e) => {
                log::warn!("Failed to load icon from {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// True when `dpi` calls for the high resolution icon.
pub fn wants_high_res(dpi: f64) -> bool {
    dpi > HIGH_RES_DPI_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::placeholder_png;
    use std::sync::Mutex;

    struct CountingSource {
        calls: Mutex<Vec<(PathBuf, u32, bool)>>,
        fail: bool,
    }

    impl IconSource for CountingSource {
        fn load(&self, executable: &Path, index: u32, high_res: bool) -> Result<DisplayIcon, IconError> {
            self.calls
                .lock()
                .unwrap()
                .push((executable.to_path_buf(), index, high_res));
            if self.fail {
                return Err(IconError::Extraction("no icon resource".into()));
            }
            let size = if high_res { 32 } else { 16 };
            Ok(DisplayIcon::from_png(placeholder_png(size, size))?)
        }
    }

    fn source(fail: bool) -> Arc<CountingSource> {
        Arc::new(CountingSource {
            calls: Mutex::new(Vec::new()),
            fail,
        })
    }

    #[test]
    fn test_dpi_threshold() {
        assert!(!wants_high_res(96.0));
        assert!(!wants_high_res(100.0));
        assert!(wants_high_res(125.0));
    }

    #[test]
    fn test_icons_are_cached_per_tier() {
        let source = source(false);
        let cache = IconCache::new(source.clone());
        let exe = Path::new("/opt/office/ONENOTE.EXE");

        let small = cache.get(exe, 0, false).unwrap();
        let again = cache.get(exe, 0, false).unwrap();
        let large = cache.get(exe, 0, true).unwrap();

        assert!(Arc::ptr_eq(&small, &again));
        assert_eq!(small.width, 16);
        assert_eq!(large.width, 32);
        assert_eq!(source.calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let source = source(true);
        let cache = IconCache::new(source.clone());
        let exe = Path::new("/opt/office/ONENOTE.EXE");

        assert!(cache.get(exe, 0, false).is_none());
        assert!(cache.get(exe, 0, false).is_none());
        assert_eq!(source.calls.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_poisoned_cache_keeps_working() {
        let source = source(false);
        let cache = Arc::new(IconCache::new(source.clone()));
        let exe = Path::new("/opt/office/ONENOTE.EXE");
        let first = cache.get(exe, 0, false).unwrap();

        let poisoner = Arc::clone(&cache);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.icons.write().unwrap();
            panic!("poison the icon cache");
        })
        .join();
        assert!(cache.icons.is_poisoned());

        let again = cache.get(exe, 0, false).unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert!(cache.get(exe, 0, true).is_some());
        assert!(cache.get(exe, 0, true).is_some());
        assert_eq!(source.calls.lock().unwrap().len(), 2);
    }
}
