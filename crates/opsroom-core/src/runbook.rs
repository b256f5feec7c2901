use crate::account::AccountBook;
use crate::config::Config;
use crate::error::Result;
use crate::resolver::{self, ResolvedAssignment};
use crate::roster::Roster;
use crate::task::{DaySheet, WorkTask};
use crate::template::{SopTemplate, TemplateBook};
use crate::types::{TaskKind, TaskOrigin, TaskPayload, TaskStatus, TimeBlock};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::path::Path;

// ---------------------------------------------------------------------------
// GenerateOutcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct GenerateOutcome {
    pub created: usize,
    pub skipped_existing: usize,
    /// Full task set for this staff/date (existing + new), so callers can
    /// render immediately without a second read.
    pub tasks: Vec<WorkTask>,
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

fn payload_for(template: &SopTemplate) -> TaskPayload {
    match template.kind {
        TaskKind::Sop => TaskPayload::Sop {
            title: template.task_label.clone(),
            instruction: template.task_label.clone(),
            steps: template.steps.clone(),
        },
        TaskKind::Content => TaskPayload::Content {
            title: template.task_label.clone(),
            brief: None,
        },
        TaskKind::OpsReply | TaskKind::OpsReport => TaskPayload::Ops {
            instruction: template.task_label.clone(),
        },
    }
}

/// Expand matching templates into work tasks for one staff member and
/// date. Idempotent: a generated task already occupying a (persona, time
/// block) slot on the sheet is skipped, and the whole batch is persisted
/// with a single atomic sheet write, so a failed write leaves no partial
/// state behind.
pub fn generate(root: &Path, staff_id: &str, date: NaiveDate) -> Result<GenerateOutcome> {
    let config = Config::load(root)?;
    let roster = Roster::load(root)?;
    let accounts = AccountBook::load(root)?;
    let resolved = resolver::resolve(&roster, &accounts, staff_id);
    let mut sheet = DaySheet::load_or_new(root, date)?;

    if resolved.is_empty() {
        tracing::debug!(staff_id, %date, "no resolved personas; generation is a no-op");
        return Ok(GenerateOutcome {
            created: 0,
            skipped_existing: 0,
            tasks: staff_tasks_sorted(&sheet, staff_id),
        });
    }

    let persona_ids: Vec<String> = {
        let mut ids: Vec<String> = Vec::new();
        for r in &resolved {
            if !ids.contains(&r.persona_id) {
                ids.push(r.persona_id.clone());
            }
        }
        ids
    };
    let book = TemplateBook::load(root)?;

    let mut created = 0usize;
    let mut skipped_existing = 0usize;
    for template in book.applicable(&persona_ids) {
        let targets: Vec<&str> = match &template.persona_id {
            Some(p) => vec![p.as_str()],
            None => persona_ids.iter().map(String::as_str).collect(),
        };
        // A legacy `weekly` template fails the whole call here; it must be
        // migrated, not silently interpreted.
        if !template
            .frequency
            .matches(date, &template.weekly_days, &template.id)?
        {
            continue;
        }
        let block = config.block_for_slot(&template.time_slot);
        for persona_id in targets {
            if sheet.has_generated(persona_id, block) {
                skipped_existing += 1;
                continue;
            }
            sheet.tasks.push(WorkTask {
                id: uuid::Uuid::new_v4().to_string(),
                persona_id: persona_id.to_string(),
                staff_id: staff_id.to_string(),
                account_id: account_for(&resolved, persona_id),
                kind: template.kind,
                task_date: date,
                scheduled_time: Some(template.time_slot.clone()),
                time_block: Some(block),
                priority: template.priority,
                payload: payload_for(template),
                status: TaskStatus::PendingPublish,
                origin: TaskOrigin::Generated,
                post_url: None,
                notes: None,
                completed_at: None,
                created_at: Utc::now(),
            });
            created += 1;
        }
    }

    if created > 0 {
        sheet.save(root)?;
    }
    tracing::info!(staff_id, %date, created, skipped_existing, "runbook generated");

    Ok(GenerateOutcome {
        created,
        skipped_existing,
        tasks: staff_tasks_sorted(&sheet, staff_id),
    })
}

fn account_for(resolved: &[ResolvedAssignment], persona_id: &str) -> Option<String> {
    resolved
        .iter()
        .find(|r| r.persona_id == persona_id && r.account_id.is_some())
        .and_then(|r| r.account_id.clone())
}

fn staff_tasks_sorted(sheet: &DaySheet, staff_id: &str) -> Vec<WorkTask> {
    let mut tasks: Vec<WorkTask> = sheet
        .tasks_for_staff(staff_id)
        .into_iter()
        .cloned()
        .collect();
    tasks.sort_by(|a, b| {
        a.time_block
            .cmp(&b.time_block)
            .then_with(|| a.scheduled_time.cmp(&b.scheduled_time))
            .then_with(|| b.priority.cmp(&a.priority))
    });
    tasks
}

// ---------------------------------------------------------------------------
// Matrix view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MatrixCellTask {
    pub id: String,
    pub label: String,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatrixRow {
    pub block: TimeBlock,
    /// One cell per persona, aligned with `RunbookMatrix::personas`.
    pub cells: Vec<Vec<MatrixCellTask>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunbookMatrix {
    pub date: NaiveDate,
    pub staff_id: String,
    pub personas: Vec<String>,
    pub rows: Vec<MatrixRow>,
}

/// Project a staff member's day onto a (time block × persona) grid.
/// Read-only; tasks with no time block (some manual ones) are not shown.
pub fn matrix(root: &Path, staff_id: &str, date: NaiveDate) -> Result<RunbookMatrix> {
    let roster = Roster::load(root)?;
    let accounts = AccountBook::load(root)?;
    let resolved = resolver::resolve(&roster, &accounts, staff_id);
    let sheet = DaySheet::load_or_new(root, date)?;

    let mut personas: Vec<String> = Vec::new();
    for r in &resolved {
        if !personas.contains(&r.persona_id) {
            personas.push(r.persona_id.clone());
        }
    }

    let rows = TimeBlock::all()
        .iter()
        .map(|&block| MatrixRow {
            block,
            cells: personas
                .iter()
                .map(|persona_id| {
                    sheet
                        .tasks_for_staff(staff_id)
                        .into_iter()
                        .filter(|t| t.persona_id == *persona_id && t.time_block == Some(block))
                        .map(|t| MatrixCellTask {
                            id: t.id.clone(),
                            label: t.payload.title().to_string(),
                            status: t.status,
                        })
                        .collect()
                })
                .collect(),
        })
        .collect();

    Ok(RunbookMatrix {
        date,
        staff_id: staff_id.to_string(),
        personas,
        rows,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;
    use crate::template::SopTemplate;
    use crate::types::{Frequency, OnboardingStatus};
    use tempfile::TempDir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    /// Workspace with staff s1 owning persona p1 with completed account
    /// acct-1, plus persona p2 with no account.
    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        crate::workspace::init(dir.path(), "test-ops").unwrap();

        let mut roster = Roster::load(dir.path()).unwrap();
        roster.add_staff("s1", "Anna").unwrap();
        roster.add_persona("p1", "Luna").unwrap();
        roster.add_persona("p2", "Vera").unwrap();
        roster.assign("s1", "p1").unwrap();
        roster.assign("s1", "p2").unwrap();
        roster.save(dir.path()).unwrap();

        let mut accounts = AccountBook::load(dir.path()).unwrap();
        let mut a1 = Account::new("acct-1", "twitter", Some("s1".to_string()));
        a1.persona_id = Some("p1".to_string());
        a1.onboarding_status = OnboardingStatus::Completed;
        accounts.add(a1).unwrap();
        accounts.save(dir.path()).unwrap();

        dir
    }

    fn add_template(dir: &TempDir, template: SopTemplate) {
        let mut book = TemplateBook::load(dir.path()).unwrap();
        book.add(template).unwrap();
        book.save(dir.path()).unwrap();
    }

    #[test]
    fn generates_one_task_per_template_persona() {
        let dir = fixture();
        let mut t = SopTemplate::new("daily-reply", "Daily Reply Check", "09:00");
        t.persona_id = Some("p1".to_string());
        add_template(&dir, t);

        let outcome = generate(dir.path(), "s1", date("2025-06-10")).unwrap();
        assert_eq!(outcome.created, 1);
        assert_eq!(outcome.tasks.len(), 1);

        let task = &outcome.tasks[0];
        assert_eq!(task.persona_id, "p1");
        assert_eq!(task.account_id.as_deref(), Some("acct-1"));
        assert_eq!(task.status, TaskStatus::PendingPublish);
        assert_eq!(task.priority, 5);
        assert_eq!(task.time_block, Some(TimeBlock::WarmUp));
    }

    #[test]
    fn generation_is_idempotent() {
        let dir = fixture();
        add_template(&dir, SopTemplate::new("generic", "Morning routine", "07:00"));

        let first = generate(dir.path(), "s1", date("2025-06-10")).unwrap();
        assert_eq!(first.created, 2); // one per persona

        let second = generate(dir.path(), "s1", date("2025-06-10")).unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.skipped_existing, 2);
        assert_eq!(second.tasks.len(), first.tasks.len());

        let sheet = DaySheet::load_or_new(dir.path(), date("2025-06-10")).unwrap();
        assert_eq!(sheet.tasks.len(), 2);
    }

    #[test]
    fn same_slot_different_personas_both_generate() {
        let dir = fixture();
        let mut t1 = SopTemplate::new("p1-post", "Post for Luna", "14:00");
        t1.persona_id = Some("p1".to_string());
        add_template(&dir, t1);
        let mut t2 = SopTemplate::new("p2-post", "Post for Vera", "14:00");
        t2.persona_id = Some("p2".to_string());
        add_template(&dir, t2);

        let outcome = generate(dir.path(), "s1", date("2025-06-10")).unwrap();
        assert_eq!(outcome.created, 2);
        let personas: Vec<&str> = outcome.tasks.iter().map(|t| t.persona_id.as_str()).collect();
        assert!(personas.contains(&"p1") && personas.contains(&"p2"));
    }

    #[test]
    fn weekly_custom_window_count() {
        let dir = fixture();
        let mut t = SopTemplate::new("mon-wed", "Schedule check", "10:00");
        t.persona_id = Some("p1".to_string());
        t.frequency = Frequency::WeeklyCustom;
        t.weekly_days = [1, 3].into_iter().collect(); // Mon, Wed
        add_template(&dir, t);

        // 14-day window starting Monday 2025-06-09.
        let mut total = 0;
        let start = date("2025-06-09");
        for offset in 0..14 {
            let d = start + chrono::Duration::days(offset);
            total += generate(dir.path(), "s1", d).unwrap().created;
        }
        assert_eq!(total, 4);
    }

    #[test]
    fn unknown_staff_is_noop_not_error() {
        let dir = fixture();
        add_template(&dir, SopTemplate::new("generic", "Routine", "07:00"));

        let outcome = generate(dir.path(), "ghost", date("2025-06-10")).unwrap();
        assert_eq!(outcome.created, 0);
        assert!(outcome.tasks.is_empty());
    }

    #[test]
    fn incomplete_account_still_generates_persona_task_without_account() {
        let dir = fixture();
        let mut t = SopTemplate::new("p2-routine", "Routine for Vera", "08:00");
        t.persona_id = Some("p2".to_string());
        add_template(&dir, t);

        let outcome = generate(dir.path(), "s1", date("2025-06-10")).unwrap();
        assert_eq!(outcome.created, 1);
        assert!(outcome.tasks[0].account_id.is_none());
    }

    #[test]
    fn legacy_weekly_template_fails_generation() {
        let dir = fixture();
        let mut book = TemplateBook::load(dir.path()).unwrap();
        let mut t = SopTemplate::new("legacy", "Weekly report", "17:00");
        t.frequency = Frequency::Weekly;
        book.templates.push(t);
        book.save(dir.path()).unwrap();

        let err = generate(dir.path(), "s1", date("2025-06-10")).unwrap_err();
        assert!(err.to_string().contains("deprecated"));

        // Nothing was persisted.
        let sheet = DaySheet::load_or_new(dir.path(), date("2025-06-10")).unwrap();
        assert!(sheet.tasks.is_empty());
    }

    #[test]
    fn manual_task_does_not_block_generation() {
        let dir = fixture();
        let mut t = SopTemplate::new("p1-reply", "Reply sweep", "09:30");
        t.persona_id = Some("p1".to_string());
        add_template(&dir, t);

        let mut sheet = DaySheet::load_or_new(dir.path(), date("2025-06-10")).unwrap();
        sheet.add_manual_task(
            "s1",
            "p1",
            None,
            TaskKind::Sop,
            TaskPayload::Sop {
                title: "Ad hoc".to_string(),
                instruction: "Ad hoc".to_string(),
                steps: vec![],
            },
            Some("09:45".to_string()),
            Some(TimeBlock::WarmUp),
            3,
        );
        sheet.save(dir.path()).unwrap();

        let outcome = generate(dir.path(), "s1", date("2025-06-10")).unwrap();
        assert_eq!(outcome.created, 1);
        assert_eq!(outcome.tasks.len(), 2);
    }

    #[test]
    fn matrix_projects_blocks_by_persona() {
        let dir = fixture();
        let mut t1 = SopTemplate::new("p1-morning", "Morning sweep", "07:00");
        t1.persona_id = Some("p1".to_string());
        add_template(&dir, t1);
        let mut t2 = SopTemplate::new("p2-evening", "Evening wrap", "21:30");
        t2.persona_id = Some("p2".to_string());
        add_template(&dir, t2);
        generate(dir.path(), "s1", date("2025-06-10")).unwrap();

        let m = matrix(dir.path(), "s1", date("2025-06-10")).unwrap();
        assert_eq!(m.personas, vec!["p1".to_string(), "p2".to_string()]);
        assert_eq!(m.rows.len(), TimeBlock::all().len());

        let wake_up = m.rows.iter().find(|r| r.block == TimeBlock::WakeUp).unwrap();
        assert_eq!(wake_up.cells[0].len(), 1);
        assert_eq!(wake_up.cells[0][0].label, "Morning sweep");
        assert!(wake_up.cells[1].is_empty());

        let closing = m.rows.iter().find(|r| r.block == TimeBlock::Closing).unwrap();
        assert!(closing.cells[0].is_empty());
        assert_eq!(closing.cells[1][0].label, "Evening wrap");
    }
}
