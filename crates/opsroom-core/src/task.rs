use crate::error::{OpsError, Result};
use crate::paths;
use crate::types::{TaskKind, TaskOrigin, TaskPayload, TaskStatus, TimeBlock};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ---------------------------------------------------------------------------
// WorkTask
// ---------------------------------------------------------------------------

/// A concrete, date-stamped work item. Created by the runbook generator or
/// by hand; mutated only through the lifecycle operations below; never
/// deleted — day-sheets are history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkTask {
    pub id: String,
    pub persona_id: String,
    pub staff_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    pub kind: TaskKind,
    pub task_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_block: Option<TimeBlock>,
    pub priority: u8,
    pub payload: TaskPayload,
    pub status: TaskStatus,
    pub origin: TaskOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// WorkTaskLog
// ---------------------------------------------------------------------------

/// Append-only audit record for completed ops-kind tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkTaskLog {
    pub id: String,
    pub task_id: String,
    pub staff_id: String,
    pub result_status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Named counters for report-type tasks, e.g. `inbound_count`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub counts: BTreeMap<String, i64>,
    pub logged_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Submission inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionInput {
    pub post_url: Option<String>,
    pub notes: Option<String>,
    pub evidence_url: Option<String>,
    #[serde(default)]
    pub counts: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftUpdate {
    pub post_url: Option<String>,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// DaySheet
// ---------------------------------------------------------------------------

/// All tasks and logs for one calendar date, persisted as a single file
/// and always rewritten whole — a failed write leaves the previous sheet
/// intact, which is what keeps generation batches atomic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySheet {
    pub date: NaiveDate,
    #[serde(default)]
    pub tasks: Vec<WorkTask>,
    #[serde(default)]
    pub logs: Vec<WorkTaskLog>,
}

impl DaySheet {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            tasks: Vec::new(),
            logs: Vec::new(),
        }
    }

    /// Load the sheet for a date, or an empty one if none exists yet.
    pub fn load_or_new(root: &Path, date: NaiveDate) -> Result<Self> {
        let path = paths::day_sheet_path(root, date);
        if !path.exists() {
            return Ok(Self::new(date));
        }
        let data = std::fs::read_to_string(&path)?;
        let sheet: DaySheet = serde_yaml::from_str(&data)?;
        Ok(sheet)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::day_sheet_path(root, self.date);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Scan the tasks directory for the sheet containing a task id.
    pub fn find_task(root: &Path, task_id: &str) -> Result<DaySheet> {
        let dir = paths::tasks_dir(root);
        if !dir.exists() {
            return Err(OpsError::TaskNotFound(task_id.to_string()));
        }
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let data = std::fs::read_to_string(entry.path())?;
            let sheet: DaySheet = serde_yaml::from_str(&data)?;
            if sheet.tasks.iter().any(|t| t.id == task_id) {
                return Ok(sheet);
            }
        }
        Err(OpsError::TaskNotFound(task_id.to_string()))
    }

    // ---------------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------------

    pub fn task(&self, id: &str) -> Result<&WorkTask> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| OpsError::TaskNotFound(id.to_string()))
    }

    fn task_mut(&mut self, id: &str) -> Result<&mut WorkTask> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| OpsError::TaskNotFound(id.to_string()))
    }

    pub fn tasks_for_staff(&self, staff_id: &str) -> Vec<&WorkTask> {
        self.tasks.iter().filter(|t| t.staff_id == staff_id).collect()
    }

    /// Dedup check for the generator: at most one generated task per
    /// (persona, time block) on a given sheet. Manual tasks are exempt.
    pub fn has_generated(&self, persona_id: &str, block: TimeBlock) -> bool {
        self.tasks.iter().any(|t| {
            t.origin == TaskOrigin::Generated
                && t.persona_id == persona_id
                && t.time_block == Some(block)
        })
    }

    pub fn logs_for_task(&self, task_id: &str) -> Vec<&WorkTaskLog> {
        self.logs.iter().filter(|l| l.task_id == task_id).collect()
    }

    // ---------------------------------------------------------------------------
    // Lifecycle operations
    // ---------------------------------------------------------------------------

    /// Complete a pending task. Ops-kind tasks get an append-only
    /// WorkTaskLog entry; content-kind tasks carry the evidence on the
    /// task itself. Calling this on a terminal task is an error and leaves
    /// the task and its logs unchanged.
    pub fn submit_completion(&mut self, task_id: &str, input: CompletionInput) -> Result<&WorkTask> {
        let task = self.task_mut(task_id)?;
        if task.status.is_terminal() {
            return Err(OpsError::InvalidTransition {
                from: task.status.to_string(),
                to: TaskStatus::Completed.to_string(),
                reason: format!("task '{task_id}' already has a recorded outcome"),
            });
        }

        let now = Utc::now();
        if let Some(url) = input.post_url {
            task.post_url = Some(url);
        }
        if let Some(notes) = &input.notes {
            task.notes = Some(notes.clone());
        }
        task.status = TaskStatus::Completed;
        task.completed_at = Some(now);

        if task.kind.is_ops() {
            let log = WorkTaskLog {
                id: uuid::Uuid::new_v4().to_string(),
                task_id: task_id.to_string(),
                staff_id: task.staff_id.clone(),
                result_status: TaskStatus::Completed,
                evidence_url: input.evidence_url,
                notes: input.notes,
                counts: input.counts,
                logged_at: now,
            };
            self.logs.push(log);
        }
        self.task(task_id)
    }

    /// Administrative skip, also terminal.
    pub fn skip_task(&mut self, task_id: &str) -> Result<&WorkTask> {
        let task = self.task_mut(task_id)?;
        if task.status.is_terminal() {
            return Err(OpsError::InvalidTransition {
                from: task.status.to_string(),
                to: TaskStatus::Skipped.to_string(),
                reason: format!("task '{task_id}' already has a recorded outcome"),
            });
        }
        task.status = TaskStatus::Skipped;
        task.completed_at = Some(Utc::now());
        self.task(task_id)
    }

    /// Incremental edit of notes/post_url before completion. Last write
    /// wins; no merging of concurrent edits is attempted.
    pub fn save_draft(&mut self, task_id: &str, update: DraftUpdate) -> Result<&WorkTask> {
        let task = self.task_mut(task_id)?;
        if task.status.is_terminal() {
            return Err(OpsError::InvalidTransition {
                from: task.status.to_string(),
                to: task.status.to_string(),
                reason: format!("task '{task_id}' is terminal; corrections go through the data store"),
            });
        }
        if let Some(url) = update.post_url {
            task.post_url = Some(url);
        }
        if let Some(notes) = update.notes {
            task.notes = Some(notes);
        }
        self.task(task_id)
    }

    /// Ad-hoc task outside the generator. Exempt from the dedup key.
    #[allow(clippy::too_many_arguments)]
    pub fn add_manual_task(
        &mut self,
        staff_id: impl Into<String>,
        persona_id: impl Into<String>,
        account_id: Option<String>,
        kind: TaskKind,
        payload: TaskPayload,
        scheduled_time: Option<String>,
        time_block: Option<TimeBlock>,
        priority: u8,
    ) -> &WorkTask {
        let task = WorkTask {
            id: uuid::Uuid::new_v4().to_string(),
            persona_id: persona_id.into(),
            staff_id: staff_id.into(),
            account_id,
            kind,
            task_date: self.date,
            scheduled_time,
            time_block,
            priority,
            payload,
            status: TaskStatus::PendingPublish,
            origin: TaskOrigin::Manual,
            post_url: None,
            notes: None,
            completed_at: None,
            created_at: Utc::now(),
        };
        self.tasks.push(task);
        self.tasks.last().unwrap()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn sheet_with_task(kind: TaskKind) -> (DaySheet, String) {
        let mut sheet = DaySheet::new(date("2025-06-10"));
        let id = sheet
            .add_manual_task(
                "s1",
                "p1",
                None,
                kind,
                TaskPayload::Ops {
                    instruction: "reply to inbound".to_string(),
                },
                Some("09:00".to_string()),
                Some(TimeBlock::WarmUp),
                5,
            )
            .id
            .clone();
        (sheet, id)
    }

    #[test]
    fn sheet_roundtrip() {
        let dir = TempDir::new().unwrap();
        let (sheet, id) = sheet_with_task(TaskKind::OpsReply);
        sheet.save(dir.path()).unwrap();

        let loaded = DaySheet::load_or_new(dir.path(), date("2025-06-10")).unwrap();
        assert_eq!(loaded.tasks.len(), 1);
        assert_eq!(loaded.task(&id).unwrap().status, TaskStatus::PendingPublish);

        // Missing date loads empty.
        let empty = DaySheet::load_or_new(dir.path(), date("2025-06-11")).unwrap();
        assert!(empty.tasks.is_empty());
    }

    #[test]
    fn find_task_scans_sheets() {
        let dir = TempDir::new().unwrap();
        let (sheet, id) = sheet_with_task(TaskKind::Content);
        sheet.save(dir.path()).unwrap();

        let found = DaySheet::find_task(dir.path(), &id).unwrap();
        assert_eq!(found.date, date("2025-06-10"));
        assert!(matches!(
            DaySheet::find_task(dir.path(), "nope"),
            Err(OpsError::TaskNotFound(_))
        ));
    }

    #[test]
    fn ops_completion_appends_log() {
        let (mut sheet, id) = sheet_with_task(TaskKind::OpsReport);
        let mut counts = BTreeMap::new();
        counts.insert("inbound_count".to_string(), 12);

        let task = sheet
            .submit_completion(
                &id,
                CompletionInput {
                    notes: Some("done".to_string()),
                    evidence_url: Some("https://example.com/shot.png".to_string()),
                    counts,
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert!(task.completed_at.is_some());

        let logs = sheet.logs_for_task(&id);
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].counts.get("inbound_count"), Some(&12));
        assert_eq!(logs[0].staff_id, "s1");
    }

    #[test]
    fn content_completion_writes_task_fields_without_log() {
        let (mut sheet, id) = sheet_with_task(TaskKind::Content);
        sheet
            .submit_completion(
                &id,
                CompletionInput {
                    post_url: Some("https://platform/post/1".to_string()),
                    notes: Some("published".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        let task = sheet.task(&id).unwrap();
        assert_eq!(task.post_url.as_deref(), Some("https://platform/post/1"));
        assert!(sheet.logs.is_empty());
    }

    #[test]
    fn double_completion_is_invalid_and_preserves_history() {
        let (mut sheet, id) = sheet_with_task(TaskKind::OpsReply);
        sheet
            .submit_completion(&id, CompletionInput::default())
            .unwrap();
        let first_completed_at = sheet.task(&id).unwrap().completed_at;

        let err = sheet
            .submit_completion(
                &id,
                CompletionInput {
                    notes: Some("overwrite attempt".to_string()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        match err {
            OpsError::InvalidTransition { from, .. } => assert_eq!(from, "completed"),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(sheet.task(&id).unwrap().completed_at, first_completed_at);
        assert_eq!(sheet.logs_for_task(&id).len(), 1);
    }

    #[test]
    fn skip_is_terminal_too() {
        let (mut sheet, id) = sheet_with_task(TaskKind::Sop);
        sheet.skip_task(&id).unwrap();
        assert_eq!(sheet.task(&id).unwrap().status, TaskStatus::Skipped);
        assert!(sheet.skip_task(&id).is_err());
        assert!(sheet
            .submit_completion(&id, CompletionInput::default())
            .is_err());
    }

    #[test]
    fn draft_saves_do_not_change_status() {
        let (mut sheet, id) = sheet_with_task(TaskKind::Content);
        sheet
            .save_draft(
                &id,
                DraftUpdate {
                    notes: Some("half-written".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        let task = sheet.task(&id).unwrap();
        assert_eq!(task.status, TaskStatus::PendingPublish);
        assert_eq!(task.notes.as_deref(), Some("half-written"));

        // Last write wins.
        sheet
            .save_draft(
                &id,
                DraftUpdate {
                    notes: Some("rewritten".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(sheet.task(&id).unwrap().notes.as_deref(), Some("rewritten"));
    }

    #[test]
    fn draft_rejected_after_terminal() {
        let (mut sheet, id) = sheet_with_task(TaskKind::Content);
        sheet.skip_task(&id).unwrap();
        assert!(sheet
            .save_draft(
                &id,
                DraftUpdate {
                    notes: Some("too late".to_string()),
                    ..Default::default()
                }
            )
            .is_err());
    }

    #[test]
    fn manual_tasks_do_not_trip_dedup() {
        let (sheet, _) = sheet_with_task(TaskKind::OpsReply);
        assert!(!sheet.has_generated("p1", TimeBlock::WarmUp));
    }
}
