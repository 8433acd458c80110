//! Default automation service: an external bridge program that talks to OneNote.
//!
//! The bridge is invoked once per operation:
//! - `pages` prints a JSON array of open pages
//! - `export-new <png> [--title <title>]` creates a page holding the image
//! - `export-page <page-id> <png> [--title <title>]` appends the image to a page
//! - `icon <exe> <index> <size>` prints the executable's icon as PNG
//!
//! A failing call exits non-zero. When the failure comes from the automation
//! layer the bridge prints `{"hresult": ..., "message": ...}` on stderr.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

use serde::Deserialize;
use serde_json::Value;

use crate::capture::{Capture, file::stage_capture};
use crate::config::{AutomationConfig, IconConfig};
use crate::destination::DisplayIcon;
use crate::onenote::{
    dependencies::{IconSource, OneNoteAutomation},
    icon::IconError,
    types::{AutomationError, OneNotePage},
};

#[derive(Debug, Clone)]
struct BridgeCommand {
    program: String,
    args: Vec<String>,
}

impl BridgeCommand {
    fn new(config: &AutomationConfig) -> Self {
        Self {
            program: config.command.clone(),
            args: config.args.clone(),
        }
    }

    fn run(&self, subcommand: &str, extra: Vec<OsString>) -> Result<Vec<u8>, AutomationError> {
        log::debug!("Running {} {}", self.program, subcommand);

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(subcommand)
            .args(extra)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                AutomationError::Unavailable(format!(
                    "Failed to run {} (is it installed?): {}",
                    self.program, e
                ))
            })?;

        if !output.status.success() {
            return Err(parse_failure(&self.program, output.status, &output.stderr));
        }

        Ok(output.stdout)
    }
}

/// Drives OneNote through the bridge program.
pub struct CommandAutomation {
    bridge: BridgeCommand,
    filename_template: String,
}

impl CommandAutomation {
    pub fn new(config: &AutomationConfig) -> Self {
        Self {
            bridge: BridgeCommand::new(config),
            filename_template: config.filename_template.clone(),
        }
    }

    fn export(
        &self,
        subcommand: &str,
        page: Option<&OneNotePage>,
        capture: &Capture,
    ) -> Result<bool, AutomationError> {
        let staged = stage_capture(capture, &self.filename_template)?;

        let mut args: Vec<OsString> = Vec::new();
        if let Some(page) = page {
            args.push(page.id.clone().into());
        }
        args.push(staged.path().as_os_str().to_os_string());
        if let Some(title) = &capture.details.title {
            args.push("--title".into());
            args.push(title.into());
        }

        let stdout = self.bridge.run(subcommand, args)?;
        parse_export_reply(&stdout)
    }
}

impl OneNoteAutomation for CommandAutomation {
    fn pages(&self) -> Result<Vec<OneNotePage>, AutomationError> {
        let stdout = self.bridge.run("pages", Vec::new())?;
        parse_pages(&stdout)
    }

    fn export_to_new_page(&self, capture: &Capture) -> Result<bool, AutomationError> {
        self.export("export-new", None, capture)
    }

    fn export_to_page(
        &self,
        capture: &Capture,
        page: &OneNotePage,
    ) -> Result<bool, AutomationError> {
        self.export("export-page", Some(page), capture)
    }
}

/// Extracts executable icons through the bridge program.
pub struct CommandIconSource {
    bridge: BridgeCommand,
    size: u32,
    high_res_size: u32,
}

impl CommandIconSource {
    pub fn new(automation: &AutomationConfig, icon: &IconConfig) -> Self {
        Self {
            bridge: BridgeCommand::new(automation),
            size: icon.size,
            high_res_size: icon.high_res_size,
        }
    }
}

impl IconSource for CommandIconSource {
    fn load(&self, executable: &Path, index: u32, high_res: bool) -> Result<DisplayIcon, IconError> {
        let size = if high_res { self.high_res_size } else { self.size };
        let png = self
            .bridge
            .run(
                "icon",
                vec![
                    executable.as_os_str().to_os_string(),
                    index.to_string().into(),
                    size.to_string().into(),
                ],
            )
            .map_err(|e| IconError::Extraction(e.to_string()))?;

        Ok(DisplayIcon::from_png(png)?)
    }
}

#[derive(Debug, Deserialize)]
struct ExportReply {
    exported: bool,
}

#[derive(Debug, Deserialize)]
struct BridgeFault {
    hresult: Value,
    #[serde(default)]
    message: String,
}

/// Parse the `pages` reply.
pub(crate) fn parse_pages(stdout: &[u8]) -> Result<Vec<OneNotePage>, AutomationError> {
    serde_json::from_slice(stdout).map_err(|e| {
        AutomationError::InvalidResponse(format!("Failed to parse page list: {}", e))
    })
}

/// Parse the reply of an export call. An empty reply means the export went through.
pub(crate) fn parse_export_reply(stdout: &[u8]) -> Result<bool, AutomationError> {
    let text = String::from_utf8_lossy(stdout);
    let text = text.trim();
    if text.is_empty() {
        return Ok(true);
    }

    serde_json::from_str::<ExportReply>(text)
        .map(|reply| reply.exported)
        .map_err(|e| {
            AutomationError::InvalidResponse(format!("Failed to parse export reply: {}", e))
        })
}

pub(crate) fn parse_failure(program: &str, status: ExitStatus, stderr: &[u8]) -> AutomationError {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();

    if let Ok(fault) = serde_json::from_str::<BridgeFault>(text) {
        if let Some(code) = parse_hresult(&fault.hresult) {
            return AutomationError::Interop {
                code,
                message: fault.message,
            };
        }
    }

    if text.is_empty() {
        AutomationError::Failed(format!("{} exited with {}", program, status))
    } else {
        AutomationError::Failed(text.to_string())
    }
}

/// Accepts HRESULTs as signed or unsigned integers, or as `0x` prefixed hex strings.
pub(crate) fn parse_hresult(value: &Value) -> Option<u32> {
    fn from_i64(n: i64) -> Option<u32> {
        if let Ok(signed) = i32::try_from(n) {
            Some(signed as u32)
        } else {
            u32::try_from(n).ok()
        }
    }

    match value {
        Value::Number(n) => n.as_i64().and_then(from_i64),
        Value::String(s) => {
            let s = s.trim();
            match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => s.parse::<i64>().ok().and_then(from_i64),
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onenote::types::BROKEN_REGISTRATION_HRESULT;
    use serde_json::json;

    #[cfg(unix)]
    fn exit_status(code: i32) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }

    #[test]
    fn test_parse_pages_keeps_order_and_flags() {
        let stdout = br#"[
            {"id": "{A}", "name": "Standup", "sectionName": "Meetings", "notebookName": "Work", "isCurrentlyViewed": false},
            {"id": "{B}", "name": "Ideas", "isCurrentlyViewed": true},
            {"id": "", "name": "Ghost", "isCurrentlyViewed": true}
        ]"#;

        let pages = parse_pages(stdout).unwrap();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].id, "{A}");
        assert_eq!(pages[0].display_name(), "Work / Meetings / Standup");
        assert!(!pages[0].is_currently_viewed);
        assert_eq!(pages[1].display_name(), "Ideas");
        assert!(pages[1].is_currently_viewed);
    }

    #[test]
    fn test_parse_pages_rejects_garbage() {
        let err = parse_pages(b"not json").unwrap_err();
        assert!(matches!(err, AutomationError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_export_reply() {
        assert!(parse_export_reply(b"").unwrap());
        assert!(parse_export_reply(b"  \n").unwrap());
        assert!(parse_export_reply(br#"{"exported": true}"#).unwrap());
        assert!(!parse_export_reply(br#"{"exported": false}"#).unwrap());
        assert!(parse_export_reply(b"yes").is_err());
    }

    #[test]
    fn test_parse_hresult_forms() {
        let expected = Some(BROKEN_REGISTRATION_HRESULT);
        assert_eq!(parse_hresult(&json!(-2147319779i64)), expected);
        assert_eq!(parse_hresult(&json!(2147647517u64)), expected);
        assert_eq!(parse_hresult(&json!("0x8002801D")), expected);
        assert_eq!(parse_hresult(&json!("0X8002801d")), expected);
        assert_eq!(parse_hresult(&json!("-2147319779")), expected);
        assert_eq!(parse_hresult(&json!(true)), None);
        assert_eq!(parse_hresult(&json!("0xZZ")), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_parse_failure_variants() {
        let interop = parse_failure(
            "onenote-bridge",
            exit_status(1),
            br#"{"hresult": "0x8002801D", "message": "Library not registered."}"#,
        );
        assert!(interop.is_broken_registration());

        let plain = parse_failure("onenote-bridge", exit_status(1), b"disk full\n");
        assert_eq!(plain.to_string(), "disk full");

        let silent = parse_failure("onenote-bridge", exit_status(3), b"");
        assert!(silent.to_string().starts_with("onenote-bridge exited with"));
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let config = AutomationConfig {
            command: "onenote-bridge-that-does-not-exist".into(),
            ..AutomationConfig::default()
        };
        let err = CommandAutomation::new(&config).pages().unwrap_err();
        assert!(matches!(err, AutomationError::Unavailable(_)));
    }

    #[cfg(unix)]
    mod script {
        use crate::capture::Capture;
        use crate::config::{AutomationConfig, IconConfig};
        use crate::onenote::bridge::{CommandAutomation, CommandIconSource};
        use crate::onenote::dependencies::{IconSource, OneNoteAutomation};
        use crate::onenote::types::OneNotePage;
        use crate::util::placeholder_png;
        use std::fs;
        use std::path::{Path, PathBuf};
        use tempfile::TempDir;

        const BRIDGE: &str = r#"#!/bin/sh
log="$(dirname "$0")/calls.log"
echo "$@" >> "$log"
case "$1" in
  pages)
    echo '[{"id":"{P1}","name":"Inbox","isCurrentlyViewed":true},{"id":"{P2}","name":"Old","isCurrentlyViewed":false}]'
    ;;
  export-new)
    test -s "$2" || exit 2
    ;;
  export-page)
    if [ "$2" = "{LOCKED}" ]; then
      echo '{"hresult": -2147319779, "message": "Library not registered."}' >&2
      exit 1
    fi
    test -s "$3" || exit 2
    echo '{"exported": true}'
    ;;
  *)
    echo "unknown command $1" >&2
    exit 64
    ;;
esac
"#;

        fn install_bridge(dir: &TempDir) -> PathBuf {
            let path = dir.path().join("bridge.sh");
            fs::write(&path, BRIDGE).unwrap();
            path
        }

        fn bridge_config(bridge: &Path) -> AutomationConfig {
            AutomationConfig {
                command: "sh".into(),
                args: vec![bridge.to_string_lossy().into_owned()],
                ..AutomationConfig::default()
            }
        }

        fn automation(bridge: &Path) -> CommandAutomation {
            CommandAutomation::new(&bridge_config(bridge))
        }

        fn page(id: &str) -> OneNotePage {
            OneNotePage {
                id: id.into(),
                name: "Inbox".into(),
                section: None,
                notebook: None,
                is_currently_viewed: true,
            }
        }

        #[test]
        fn test_pages_via_script() {
            let dir = TempDir::new().unwrap();
            let bridge = install_bridge(&dir);
            let pages = automation(&bridge).pages().unwrap();
            assert_eq!(pages.len(), 2);
            assert_eq!(pages[0].id, "{P1}");
        }

        #[test]
        fn test_exports_via_script() {
            let dir = TempDir::new().unwrap();
            let bridge = install_bridge(&dir);
            let automation = automation(&bridge);
            let capture =
                Capture::from_png_bytes(placeholder_png(4, 4), Some("Build failure".into())).unwrap();

            assert!(automation.export_to_new_page(&capture).unwrap());
            assert!(automation.export_to_page(&capture, &page("{P1}")).unwrap());

            let calls = fs::read_to_string(dir.path().join("calls.log")).unwrap();
            let lines: Vec<&str> = calls.lines().collect();
            assert_eq!(lines.len(), 2);
            assert!(lines[0].starts_with("export-new "));
            assert!(lines[0].ends_with("--title Build failure"));
            assert!(lines[1].starts_with("export-page {P1} "));
        }

        #[test]
        fn test_interop_failure_via_script() {
            let dir = TempDir::new().unwrap();
            let bridge = install_bridge(&dir);
            let capture = Capture::from_png_bytes(placeholder_png(4, 4), None).unwrap();

            let err = automation(&bridge)
                .export_to_page(&capture, &page("{LOCKED}"))
                .unwrap_err();
            assert!(err.is_broken_registration());
        }

        #[test]
        fn test_icon_failure_via_script() {
            let dir = TempDir::new().unwrap();
            let bridge = install_bridge(&dir);
            let source = CommandIconSource::new(&bridge_config(&bridge), &IconConfig::default());

            let err = source
                .load(Path::new("/opt/office/ONENOTE.EXE"), 0, false)
                .unwrap_err();
            assert!(err.to_string().contains("unknown command icon"));
        }
    }
}
