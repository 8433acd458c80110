//! Microsoft OneNote export destination.
//!
//! This module provides:
//! - Locating the installed OneNote executable (availability probe)
//! - Listing the pages currently open in OneNote as child destinations
//! - Exporting a capture to a new page or to an open page
//! - Cached destination icons extracted from the executable
//!
//! OneNote itself is driven through [`OneNoteAutomation`]; the default
//! implementation shells out to a bridge program (see [`bridge`]).

pub mod bridge;
pub mod icon;
pub mod probe;
pub mod types;

mod dependencies;
mod destination;

pub use dependencies::{ExecutableLocator, IconSource, OneNoteAutomation, OneNoteDependencies};
pub use destination::{
    APPLICATION_NAME, DESIGNATION, DestinationBinding, OneNoteDestination, PRIORITY,
    REGISTRATION_FIX_URL, enumeration_warnings,
};
pub use types::{AutomationError, BROKEN_REGISTRATION_HRESULT, OneNotePage};
