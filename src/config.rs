//! Optional project configuration.
//!
//! A `project.hcl` file next to the input source may name the project and the
//! output binary:
//!
//! ```hcl
//! project {
//!   name = "updater"
//! }
//! build {
//!   binary_name = "update-tool"
//! }
//! ```
//!
//! Only the accepted subset above is scanned; anything else is skipped.
//! A missing or malformed file degrades to defaults without an error, and
//! nothing here ever affects C emission — the names feed packaging only.

use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "project.hcl";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub project_name: Option<String>,
    pub binary_name: Option<String>,
}

/// Load the config that sits next to `input`, if any.
pub fn load_for(input: &Path) -> Config {
    let dir = input.parent().filter(|p| !p.as_os_str().is_empty());
    let path = dir.unwrap_or(Path::new(".")).join(CONFIG_FILE);
    match fs::read_to_string(&path) {
        Ok(text) => parse(&text),
        Err(_) => Config::default(),
    }
}

/// Scan the two known blocks for their `key = "value"` entries.
pub fn parse(text: &str) -> Config {
    let mut config = Config::default();
    let mut block: Option<String> = None;

    for line in text.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        if let Some(head) = line.strip_suffix('{') {
            block = Some(head.trim().to_string());
            continue;
        }
        if line == "}" {
            block = None;
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let Some(value) = value
            .trim()
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
        else {
            continue;
        };
        match (block.as_deref(), key) {
            (Some("project"), "name") => config.project_name = Some(value.to_string()),
            (Some("build"), "binary_name") => config.binary_name = Some(value.to_string()),
            _ => {}
        }
    }
    config
}

// ── Tests ────────────────────────────────────────────────────────────────────
