use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::capture::Capture;
use crate::config::Config;
use crate::destination::DisplayIcon;
use crate::onenote::{
    bridge::{CommandAutomation, CommandIconSource},
    icon::{IconCache, IconError},
    probe::AvailabilityProbe,
    types::{AutomationError, OneNotePage},
};

/// Abstraction over OneNote's automation interface.
pub trait OneNoteAutomation: Send + Sync {
    /// All pages currently open in OneNote, in the order OneNote reports them.
    fn pages(&self) -> Result<Vec<OneNotePage>, AutomationError>;

    /// Create a new page holding the capture.
    fn export_to_new_page(&self, capture: &Capture) -> Result<bool, AutomationError>;

    /// Append the capture to an existing page.
    fn export_to_page(
        &self,
        capture: &Capture,
        page: &OneNotePage,
    ) -> Result<bool, AutomationError>;
}

/// Abstraction over locating an installed executable by file name.
pub trait ExecutableLocator: Send + Sync {
    fn find_executable(&self, name: &str) -> Option<PathBuf>;
}

/// Abstraction over extracting an icon from an executable's resources.
pub trait IconSource: Send + Sync {
    fn load(&self, executable: &Path, index: u32, high_res: bool) -> Result<DisplayIcon, IconError>;
}

/// Bundle of collaborators used by the OneNote destination. Each component can be mocked in tests.
#[derive(Clone)]
pub struct OneNoteDependencies {
    pub automation: Arc<dyn OneNoteAutomation>,
    pub probe: Arc<AvailabilityProbe>,
    pub icons: Arc<IconCache>,
    /// Icon resource index inside the executable.
    pub icon_index: u32,
    /// Base activation flag from the destination settings.
    pub enabled: bool,
}

impl OneNoteDependencies {
    /// Production collaborators built from the user configuration.
    ///
    /// The availability probe and the icon cache are shared by the whole process.
    pub fn from_config(config: &Config) -> Self {
        let automation = Arc::new(CommandAutomation::new(&config.automation));
        let icon_source = Arc::new(CommandIconSource::new(&config.automation, &config.icon));

        Self {
            automation,
            probe: AvailabilityProbe::shared(&config.onenote),
            icons: IconCache::shared(icon_source),
            icon_index: config.icon.index,
            enabled: config.destinations.is_enabled(super::DESIGNATION),
        }
    }
}
