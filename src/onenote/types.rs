//! Data types for the OneNote integration.

use serde::Deserialize;
use thiserror::Error;

use crate::capture::CaptureError;

/// `TYPE_E_LIBNOTREGISTERED`: the automation type library registration is broken.
pub const BROKEN_REGISTRATION_HRESULT: u32 = 0x8002_801D;

/// A page currently open in OneNote, as reported by the automation service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneNotePage {
    /// Automation identity of the page.
    pub id: String,
    pub name: String,
    #[serde(default, rename = "sectionName")]
    pub section: Option<String>,
    #[serde(default, rename = "notebookName")]
    pub notebook: Option<String>,
    /// Whether the page is showing in a OneNote window right now.
    #[serde(default)]
    pub is_currently_viewed: bool,
}

impl OneNotePage {
    /// `notebook / section / page`, leaving out whatever is unknown.
    pub fn display_name(&self) -> String {
        [self.notebook.as_deref(), self.section.as_deref(), Some(self.name.as_str())]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Errors raised while talking to OneNote's automation interface.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("OneNote automation is not available: {0}")]
    Unavailable(String),

    #[error("{message} (HRESULT 0x{code:08X})")]
    Interop { code: u32, message: String },

    #[error("{0}")]
    Failed(String),

    #[error("Automation returned invalid response: {0}")]
    InvalidResponse(String),

    #[error(transparent)]
    Capture(#[from] CaptureError),
}

impl AutomationError {
    /// True for the error raised when OneNote's COM registration is corrupted.
    pub fn is_broken_registration(&self) -> bool {
        matches!(self, AutomationError::Interop { code, .. } if *code == BROKEN_REGISTRATION_HRESULT)
    }

    /// Failure text reported to the user, without the interop error code.
    pub fn failure_message(&self) -> String {
        match self {
            AutomationError::Interop { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
