use axum::extract::{Path, State};
use axum::Json;
use std::collections::BTreeMap;

use crate::error::AppError;
use crate::routes::parse_date;
use crate::state::AppState;
use opsroom_core::roster::Roster;
use opsroom_core::task::{CompletionInput, DaySheet, DraftUpdate};
use opsroom_core::types::{TaskKind, TaskPayload, TaskStatus, TimeBlock};

// ---------------------------------------------------------------------------
// Task updates
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct UpdateTaskBody {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub post_url: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub evidence_url: Option<String>,
    #[serde(default)]
    pub counts: BTreeMap<String, i64>,
}

/// PUT /api/work-tasks/:id — draft save, or completion/skip when `status`
/// is set to a terminal value.
pub async fn update_task(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateTaskBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let target = match body.status.as_deref() {
        None => None,
        Some(s) => Some(s.parse::<TaskStatus>().map_err(AppError::from)?),
    };
    if target == Some(TaskStatus::PendingPublish) {
        return Err(AppError::bad_request(
            "status may only be set to 'completed' or 'skipped'",
        ));
    }

    let _guard = app.write_lock.lock().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut sheet = DaySheet::find_task(&root, &id)?;
        let task = match target {
            Some(TaskStatus::Completed) => sheet.submit_completion(
                &id,
                CompletionInput {
                    post_url: body.post_url,
                    notes: body.notes,
                    evidence_url: body.evidence_url,
                    counts: body.counts,
                },
            )?,
            Some(TaskStatus::Skipped) => sheet.skip_task(&id)?,
            _ => sheet.save_draft(
                &id,
                DraftUpdate {
                    post_url: body.post_url,
                    notes: body.notes,
                },
            )?,
        };
        let value = serde_json::to_value(task)?;
        sheet.save(&root)?;
        Ok::<_, opsroom_core::OpsError>(value)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Manual tasks
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct ManualTaskBody {
    pub staff_id: String,
    pub persona_id: String,
    #[serde(default)]
    pub account_id: Option<String>,
    pub kind: TaskKind,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub instruction: Option<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub scheduled_time: Option<String>,
    #[serde(default)]
    pub time_block: Option<TimeBlock>,
    #[serde(default = "default_priority")]
    pub priority: u8,
}

fn default_priority() -> u8 {
    5
}

fn payload_from(body: &ManualTaskBody) -> Result<TaskPayload, AppError> {
    let title = body.title.clone().or_else(|| body.instruction.clone());
    match body.kind {
        TaskKind::OpsReply | TaskKind::OpsReport => {
            let instruction = body
                .instruction
                .clone()
                .or_else(|| body.title.clone())
                .ok_or_else(|| AppError::bad_request("ops tasks require an instruction"))?;
            Ok(TaskPayload::Ops { instruction })
        }
        TaskKind::Content => {
            let title =
                title.ok_or_else(|| AppError::bad_request("content tasks require a title"))?;
            Ok(TaskPayload::Content {
                title,
                brief: body.instruction.clone(),
            })
        }
        TaskKind::Sop => {
            let title = title.ok_or_else(|| AppError::bad_request("sop tasks require a title"))?;
            Ok(TaskPayload::Sop {
                instruction: body.instruction.clone().unwrap_or_else(|| title.clone()),
                title,
                steps: body.steps.clone(),
            })
        }
    }
}

/// POST /api/work-tasks — create an ad-hoc task outside the generator.
pub async fn create_manual_task(
    State(app): State<AppState>,
    Json(body): Json<ManualTaskBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let date = parse_date(body.date.as_deref())?;
    let payload = payload_from(&body)?;
    // Same bound templates enforce.
    if !(1..=10).contains(&body.priority) {
        return Err(AppError::bad_request(
            "priority must be between 1 and 10",
        ));
    }

    let _guard = app.write_lock.lock().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let roster = Roster::load(&root)?;
        roster.staff(&body.staff_id)?;
        roster.persona(&body.persona_id)?;

        let mut sheet = DaySheet::load_or_new(&root, date)?;
        let task = sheet.add_manual_task(
            &body.staff_id,
            &body.persona_id,
            body.account_id.clone(),
            body.kind,
            payload,
            body.scheduled_time.clone(),
            body.time_block,
            body.priority,
        );
        let value = serde_json::to_value(task)?;
        sheet.save(&root)?;
        Ok::<_, opsroom_core::OpsError>(value)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
