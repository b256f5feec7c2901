use crate::error::{OpsError, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const OPSROOM_DIR: &str = ".opsroom";
pub const TASKS_DIR: &str = ".opsroom/tasks";

pub const CONFIG_FILE: &str = ".opsroom/config.yaml";
pub const ROSTER_FILE: &str = ".opsroom/roster.yaml";
pub const ACCOUNTS_FILE: &str = ".opsroom/accounts.yaml";
pub const TEMPLATES_FILE: &str = ".opsroom/templates.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn opsroom_dir(root: &Path) -> PathBuf {
    root.join(OPSROOM_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn roster_path(root: &Path) -> PathBuf {
    root.join(ROSTER_FILE)
}

pub fn accounts_path(root: &Path) -> PathBuf {
    root.join(ACCOUNTS_FILE)
}

pub fn templates_path(root: &Path) -> PathBuf {
    root.join(TEMPLATES_FILE)
}

pub fn tasks_dir(root: &Path) -> PathBuf {
    root.join(TASKS_DIR)
}

/// One day-sheet file per calendar date, e.g. `.opsroom/tasks/2025-06-10.yaml`.
pub fn day_sheet_path(root: &Path, date: NaiveDate) -> PathBuf {
    tasks_dir(root).join(format!("{}.yaml", date.format("%Y-%m-%d")))
}

// ---------------------------------------------------------------------------
// Id validation
// ---------------------------------------------------------------------------

static ID_RE: OnceLock<Regex> = OnceLock::new();

fn id_re() -> &'static Regex {
    ID_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

/// Validate a human-assigned id (staff, persona, account, template).
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() || id.len() > 64 || !id_re().is_match(id) {
        return Err(OpsError::InvalidId(id.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
