use crate::error::{OpsError, Result};
use crate::paths;
use crate::types::{parse_time_slot, TimeBlock};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Block windows
// ---------------------------------------------------------------------------

/// Start of a time block within the working day. A slot belongs to the
/// window with the greatest start at or before it; slots earlier than the
/// first window fall back to the default block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockWindow {
    pub block: TimeBlock,
    pub start: String,
}

fn default_windows() -> Vec<BlockWindow> {
    [
        (TimeBlock::WakeUp, "06:00"),
        (TimeBlock::WarmUp, "09:00"),
        (TimeBlock::Production, "12:00"),
        (TimeBlock::War, "18:00"),
        (TimeBlock::Closing, "21:00"),
    ]
    .into_iter()
    .map(|(block, start)| BlockWindow {
        block,
        start: start.to_string(),
    })
    .collect()
}

fn default_block() -> TimeBlock {
    TimeBlock::Production
}

fn default_version() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    pub project: String,
    #[serde(default = "default_windows")]
    pub block_windows: Vec<BlockWindow>,
    #[serde(default = "default_block")]
    pub default_block: TimeBlock,
}

impl Config {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            version: 1,
            project: project.into(),
            block_windows: default_windows(),
            default_block: default_block(),
        }
    }

    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(OpsError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&data)?;
        Ok(config)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Map a "HH:MM" slot to its time block. Unparsable slots resolve to
    /// the default block rather than failing generation.
    pub fn block_for_slot(&self, slot: &str) -> TimeBlock {
        let Ok(minutes) = parse_time_slot(slot) else {
            return self.default_block;
        };
        let mut best: Option<(u32, TimeBlock)> = None;
        for w in &self.block_windows {
            let Ok(start) = parse_time_slot(&w.start) else {
                continue;
            };
            if start <= minutes && best.map(|(s, _)| start >= s).unwrap_or(true) {
                best = Some((start, w.block));
            }
        }
        best.map(|(_, b)| b).unwrap_or(self.default_block)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_roundtrip() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".opsroom")).unwrap();

        let config = Config::new("persona-ops");
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.project, "persona-ops");
        assert_eq!(loaded.block_windows.len(), 5);
    }

    #[test]
    fn config_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(OpsError::NotInitialized)
        ));
    }

    #[test]
    fn default_block_mapping() {
        let config = Config::new("test");
        assert_eq!(config.block_for_slot("06:30"), TimeBlock::WakeUp);
        assert_eq!(config.block_for_slot("09:00"), TimeBlock::WarmUp);
        assert_eq!(config.block_for_slot("14:15"), TimeBlock::Production);
        assert_eq!(config.block_for_slot("19:00"), TimeBlock::War);
        assert_eq!(config.block_for_slot("23:45"), TimeBlock::Closing);
    }

    #[test]
    fn early_and_unparsable_slots_fall_back() {
        let config = Config::new("test");
        // Before the first window and garbage both land on the default.
        assert_eq!(config.block_for_slot("04:00"), TimeBlock::Production);
        assert_eq!(config.block_for_slot("not-a-time"), TimeBlock::Production);
    }
}
