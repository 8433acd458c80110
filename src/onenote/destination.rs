use std::path::Path;
use std::sync::Arc;

use crate::capture::Capture;
use crate::destination::{Destination, DisplayIcon, ExportInformation};
use crate::onenote::{
    dependencies::OneNoteDependencies,
    icon::wants_high_res,
    types::{AutomationError, OneNotePage},
};

/// Identifier shared by every OneNote destination.
pub const DESIGNATION: &str = "OneNote";

/// Label of the destination that creates a new page.
pub const APPLICATION_NAME: &str = "Microsoft OneNote";

/// Ordering weight among sibling destinations.
pub const PRIORITY: i32 = 4;

/// Knowledge base entry describing how to repair the broken registration.
pub const REGISTRATION_FIX_URL: &str =
    "http://microsoftmercenary.com/wp/outlook-excel-interop-calls-breaking-solved/";

/// What an export through this destination does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DestinationBinding {
    /// Create a new page holding the capture.
    NewPage,
    /// Append the capture to an open page.
    Page(OneNotePage),
}

/// Export destination for Microsoft OneNote.
///
/// The unbound instance creates a new page. Expanding it yields one bound
/// instance per page currently on screen in OneNote.
#[derive(Clone)]
pub struct OneNoteDestination {
    dependencies: OneNoteDependencies,
    binding: DestinationBinding,
}

impl OneNoteDestination {
    pub fn new(dependencies: OneNoteDependencies) -> Self {
        Self {
            dependencies,
            binding: DestinationBinding::NewPage,
        }
    }

    pub fn for_page(dependencies: OneNoteDependencies, page: OneNotePage) -> Self {
        Self {
            dependencies,
            binding: DestinationBinding::Page(page),
        }
    }

    pub fn binding(&self) -> &DestinationBinding {
        &self.binding
    }

    /// Resolved OneNote executable, if installed.
    pub fn executable(&self) -> Option<&Path> {
        self.dependencies.probe.executable_path()
    }

    /// One bound destination per page currently being viewed, in OneNote's order.
    ///
    /// Automation failures are logged and produce no destinations. Pages
    /// without an id cannot be exported to and are skipped.
    pub fn page_destinations(&self) -> impl Iterator<Item = OneNoteDestination> + use<> {
        let pages = match self.dependencies.automation.pages() {
            Ok(pages) => pages,
            Err(err) => {
                for warning in enumeration_warnings(&err) {
                    log::warn!("{}", warning);
                }
                Vec::new()
            }
        };

        let dependencies = self.dependencies.clone();
        pages
            .into_iter()
            .filter(|page| page.is_currently_viewed)
            .filter(|page| {
                if page.id.trim().is_empty() {
                    log::warn!("Skipping OneNote page '{}' without an id", page.name);
                    return false;
                }
                true
            })
            .map(move |page| OneNoteDestination::for_page(dependencies.clone(), page))
    }
}

impl Destination for OneNoteDestination {
    fn designation(&self) -> &str {
        DESIGNATION
    }

    fn description(&self) -> String {
        match &self.binding {
            DestinationBinding::NewPage => APPLICATION_NAME.to_string(),
            DestinationBinding::Page(page) => page.display_name(),
        }
    }

    fn priority(&self) -> i32 {
        PRIORITY
    }

    fn is_dynamic(&self) -> bool {
        true
    }

    fn is_active(&self) -> bool {
        self.dependencies.probe.is_active(self.dependencies.enabled)
    }

    fn display_icon(&self, dpi: f64) -> Option<Arc<DisplayIcon>> {
        let path = self.dependencies.probe.executable_path()?;
        self.dependencies
            .icons
            .get(path, self.dependencies.icon_index, wants_high_res(dpi))
    }

    fn dynamic_destinations(&self) -> Box<dyn Iterator<Item = Box<dyn Destination>>> {
        Box::new(
            self.page_destinations()
                .map(|destination| Box::new(destination) as Box<dyn Destination>),
        )
    }

    fn export_capture(&self, manually_initiated: bool, capture: &Capture) -> ExportInformation {
        let mut export_information = ExportInformation::new(DESIGNATION, self.description());
        log::debug!(
            "Exporting {}x{} capture to '{}' (manually initiated: {})",
            capture.details.width,
            capture.details.height,
            export_information.description,
            manually_initiated
        );

        let automation = &self.dependencies.automation;
        let outcome = match &self.binding {
            DestinationBinding::NewPage => automation.export_to_new_page(capture),
            DestinationBinding::Page(page) => automation.export_to_page(capture, page),
        };

        match outcome {
            Ok(export_made) => {
                export_information.export_made = export_made;
                if export_made {
                    log::info!("Exported capture to {}", export_information.description);
                } else {
                    log::warn!(
                        "OneNote did not accept the capture for {}",
                        export_information.description
                    );
                }
            }
            Err(e) => {
                log::error!(
                    "Export to {} failed: {}",
                    export_information.description,
                    e
                );
                export_information.error_message = Some(e.failure_message());
            }
        }

        export_information
    }
}

/// Warnings to log when listing OneNote pages failed.
///
/// A broken automation registration is a local misconfiguration the user can
/// fix, so it gets an extra line pointing at the fix.
pub fn enumeration_warnings(err: &AutomationError) -> Vec<String> {
    let mut warnings = Vec::with_capacity(2);
    if err.is_broken_registration() {
        warnings.push(format!(
            "Wrong registry keys, to solve this remove the OneNote key as described here: {}",
            REGISTRATION_FIX_URL
        ));
    }
    warnings.push(format!(
        "Problem retrieving OneNote destinations, ignoring: {}",
        err
    ));
    warnings
}
