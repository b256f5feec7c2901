use crate::error::{OpsError, Result};
use crate::paths;
use crate::types::{parse_time_slot, Frequency, TaskKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

// ---------------------------------------------------------------------------
// SopTemplate
// ---------------------------------------------------------------------------

/// A reusable definition of a recurring task: what, when, how often, and
/// for which persona. `persona_id: None` means generic — it expands once
/// per persona the staff member owns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SopTemplate {
    pub id: String,
    pub task_label: String,
    /// "HH:MM" within the working day.
    pub time_slot: String,
    pub priority: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_id: Option<String>,
    pub frequency: Frequency,
    /// 0 = Sunday .. 6 = Saturday; only meaningful for `weekly_custom`.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub weekly_days: BTreeSet<u8>,
    #[serde(default = "default_kind")]
    pub kind: TaskKind,
    /// Ordered checklist ("rule") carried into generated task payloads.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_kind() -> TaskKind {
    TaskKind::Sop
}

impl SopTemplate {
    pub fn new(id: impl Into<String>, task_label: impl Into<String>, time_slot: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            task_label: task_label.into(),
            time_slot: time_slot.into(),
            priority: 5,
            persona_id: None,
            frequency: Frequency::Daily,
            weekly_days: BTreeSet::new(),
            kind: TaskKind::Sop,
            steps: Vec::new(),
            enabled: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<()> {
        paths::validate_id(&self.id)?;
        parse_time_slot(&self.time_slot)?;

        let invalid = |reason: &str| OpsError::InvalidTemplate {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if !(1..=10).contains(&self.priority) {
            return Err(invalid("priority must be between 1 and 10"));
        }
        if self.weekly_days.iter().any(|d| *d > 6) {
            return Err(invalid("weekly_days entries must be 0 (Sun) through 6 (Sat)"));
        }
        match self.frequency {
            Frequency::WeeklyCustom => {
                if self.weekly_days.is_empty() {
                    return Err(invalid("weekly_custom requires a non-empty weekly_days"));
                }
            }
            Frequency::Weekly => {
                return Err(OpsError::DeprecatedFrequency(self.id.clone()));
            }
            _ => {
                if !self.weekly_days.is_empty() {
                    return Err(invalid("weekly_days is only meaningful for weekly_custom"));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// TemplateBook
// ---------------------------------------------------------------------------

/// The persisted template collection — one YAML file for the whole store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateBook {
    #[serde(default)]
    pub templates: Vec<SopTemplate>,
}

impl TemplateBook {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::templates_path(root);
        if !path.exists() {
            return Err(OpsError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let book: TemplateBook = serde_yaml::from_str(&data)?;
        Ok(book)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::templates_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn get(&self, id: &str) -> Result<&SopTemplate> {
        self.templates
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| OpsError::TemplateNotFound(id.to_string()))
    }

    pub fn add(&mut self, template: SopTemplate) -> Result<()> {
        template.validate()?;
        if self.templates.iter().any(|t| t.id == template.id) {
            return Err(OpsError::TemplateExists(template.id));
        }
        self.templates.push(template);
        Ok(())
    }

    pub fn update(&mut self, mut template: SopTemplate) -> Result<()> {
        template.validate()?;
        let slot = self
            .templates
            .iter_mut()
            .find(|t| t.id == template.id)
            .ok_or_else(|| OpsError::TemplateNotFound(template.id.clone()))?;
        template.created_at = slot.created_at;
        template.updated_at = Utc::now();
        *slot = template;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<SopTemplate> {
        let pos = self
            .templates
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| OpsError::TemplateNotFound(id.to_string()))?;
        Ok(self.templates.remove(pos))
    }

    /// Rewrite a legacy `weekly` template as `weekly_custom` anchored to a
    /// single weekday (0 = Sun .. 6 = Sat).
    pub fn migrate_weekly(&mut self, id: &str, weekday: u8) -> Result<&SopTemplate> {
        if weekday > 6 {
            return Err(OpsError::InvalidTemplate {
                id: id.to_string(),
                reason: "anchor weekday must be 0 (Sun) through 6 (Sat)".to_string(),
            });
        }
        let template = self
            .templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| OpsError::TemplateNotFound(id.to_string()))?;
        if template.frequency != Frequency::Weekly {
            return Err(OpsError::InvalidTemplate {
                id: id.to_string(),
                reason: format!(
                    "migration only applies to frequency 'weekly', found '{}'",
                    template.frequency
                ),
            });
        }
        template.frequency = Frequency::WeeklyCustom;
        template.weekly_days = [weekday].into_iter().collect();
        template.updated_at = Utc::now();
        Ok(template)
    }

    /// Enabled templates applicable to the given personas: generic ones
    /// plus those scoped to a persona in the set.
    pub fn applicable<'a>(&'a self, persona_ids: &[String]) -> Vec<&'a SopTemplate> {
        self.templates
            .iter()
            .filter(|t| t.enabled)
            .filter(|t| match &t.persona_id {
                None => true,
                Some(p) => persona_ids.iter().any(|id| id == p),
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
