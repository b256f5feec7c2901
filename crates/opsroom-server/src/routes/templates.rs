use axum::extract::{Path, State};
use axum::Json;
use std::collections::BTreeSet;

use crate::error::AppError;
use crate::state::AppState;
use opsroom_core::template::{SopTemplate, TemplateBook};
use opsroom_core::types::{Frequency, TaskKind};

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
pub struct TemplateBody {
    pub id: String,
    pub task_label: String,
    pub time_slot: String,
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default)]
    pub persona_id: Option<String>,
    pub frequency: Frequency,
    #[serde(default)]
    pub weekly_days: BTreeSet<u8>,
    #[serde(default = "default_kind")]
    pub kind: TaskKind,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_priority() -> u8 {
    5
}

fn default_kind() -> TaskKind {
    TaskKind::Sop
}

fn default_enabled() -> bool {
    true
}

impl TemplateBody {
    fn into_template(self) -> SopTemplate {
        let mut t = SopTemplate::new(self.id, self.task_label, self.time_slot);
        t.priority = self.priority;
        t.persona_id = self.persona_id;
        t.frequency = self.frequency;
        t.weekly_days = self.weekly_days;
        t.kind = self.kind;
        t.steps = self.steps;
        t.enabled = self.enabled;
        t
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/templates — list all templates.
pub async fn list_templates(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let book = TemplateBook::load(&root)?;
        let value = serde_json::to_value(&book.templates)?;
        Ok::<_, opsroom_core::OpsError>(value)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/templates — create a template.
pub async fn create_template(
    State(app): State<AppState>,
    Json(body): Json<TemplateBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _guard = app.write_lock.lock().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let template = body.into_template();
        let id = template.id.clone();
        let mut book = TemplateBook::load(&root)?;
        book.add(template)?;
        book.save(&root)?;
        let value = serde_json::to_value(book.get(&id)?)?;
        Ok::<_, opsroom_core::OpsError>(value)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// PUT /api/templates/:id — replace a template's definition.
pub async fn update_template(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<TemplateBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.id != id {
        return Err(AppError::bad_request(format!(
            "body id '{}' does not match path id '{id}'",
            body.id
        )));
    }
    let _guard = app.write_lock.lock().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut book = TemplateBook::load(&root)?;
        book.update(body.into_template())?;
        book.save(&root)?;
        let value = serde_json::to_value(book.get(&id)?)?;
        Ok::<_, opsroom_core::OpsError>(value)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// DELETE /api/templates/:id — remove a template.
pub async fn delete_template(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _guard = app.write_lock.lock().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut book = TemplateBook::load(&root)?;
        let removed = book.remove(&id)?;
        book.save(&root)?;
        Ok::<_, opsroom_core::OpsError>(serde_json::json!({
            "id": removed.id,
            "deleted": true,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct MigrateBody {
    /// Anchor day, 0 = Sunday .. 6 = Saturday.
    pub weekday: u8,
}

/// POST /api/templates/:id/migrate — convert a legacy `weekly` template
/// to `weekly_custom` with an explicit anchor day.
pub async fn migrate_template(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<MigrateBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _guard = app.write_lock.lock().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut book = TemplateBook::load(&root)?;
        let migrated = book.migrate_weekly(&id, body.weekday)?.clone();
        book.save(&root)?;
        let value = serde_json::to_value(&migrated)?;
        Ok::<_, opsroom_core::OpsError>(value)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
