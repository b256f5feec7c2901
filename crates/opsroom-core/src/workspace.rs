use crate::account::AccountBook;
use crate::config::Config;
use crate::error::Result;
use crate::io;
use crate::paths;
use crate::roster::Roster;
use crate::template::TemplateBook;
use std::path::Path;

/// Bootstrap the `.opsroom/` directory with default config and empty
/// books. Idempotent: existing files are left alone.
pub fn init(root: &Path, project: &str) -> Result<Config> {
    io::ensure_dir(&paths::opsroom_dir(root))?;
    io::ensure_dir(&paths::tasks_dir(root))?;

    let config = Config::new(project);
    io::write_if_missing(
        &paths::config_path(root),
        serde_yaml::to_string(&config)?.as_bytes(),
    )?;
    io::write_if_missing(
        &paths::roster_path(root),
        serde_yaml::to_string(&Roster::default())?.as_bytes(),
    )?;
    io::write_if_missing(
        &paths::accounts_path(root),
        serde_yaml::to_string(&AccountBook::default())?.as_bytes(),
    )?;
    io::write_if_missing(
        &paths::templates_path(root),
        serde_yaml::to_string(&TemplateBook::default())?.as_bytes(),
    )?;

    Config::load(root)
}

pub fn is_initialized(root: &Path) -> bool {
    paths::config_path(root).exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_creates_skeleton() {
        let dir = TempDir::new().unwrap();
        assert!(!is_initialized(dir.path()));

        let config = init(dir.path(), "persona-ops").unwrap();
        assert_eq!(config.project, "persona-ops");
        assert!(is_initialized(dir.path()));
        assert!(Roster::load(dir.path()).unwrap().staff.is_empty());
        assert!(TemplateBook::load(dir.path()).unwrap().templates.is_empty());
    }

    #[test]
    fn init_preserves_existing_data() {
        let dir = TempDir::new().unwrap();
        init(dir.path(), "first").unwrap();

        let mut roster = Roster::load(dir.path()).unwrap();
        roster.add_staff("s1", "Anna").unwrap();
        roster.save(dir.path()).unwrap();

        // Re-init must not clobber.
        let config = init(dir.path(), "second").unwrap();
        assert_eq!(config.project, "first");
        assert_eq!(Roster::load(dir.path()).unwrap().staff.len(), 1);
    }
}
