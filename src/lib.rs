//! Export screenshots into Microsoft OneNote.
//!
//! Exposes a OneNote export destination for screenshot tools: a single
//! "Microsoft OneNote" entry that creates a new page, expandable into one
//! entry per page currently open in OneNote. Configuration types are public so
//! external tools can share validation and serialization code with the binary.

pub mod capture;
pub mod config;
pub mod destination;
pub mod onenote;
pub mod util;

pub use capture::Capture;
pub use config::Config;
pub use destination::{Destination, ExportInformation};
pub use onenote::{OneNoteDependencies, OneNoteDestination};
