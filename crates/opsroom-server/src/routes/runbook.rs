use axum::extract::{Query, State};
use axum::Json;

use crate::error::AppError;
use crate::routes::parse_date;
use crate::state::AppState;
use opsroom_core::account::AccountBook;
use opsroom_core::resolver;
use opsroom_core::roster::Roster;
use opsroom_core::runbook;
use opsroom_core::task::DaySheet;

#[derive(serde::Deserialize)]
pub struct RunbookQuery {
    pub staff_id: String,
    #[serde(default)]
    pub date: Option<String>,
}

/// GET /api/runbook/today — a staff member's tasks for a date plus the
/// resolved (account, persona) map for rendering.
pub async fn today(
    State(app): State<AppState>,
    Query(query): Query<RunbookQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let date = parse_date(query.date.as_deref())?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let roster = Roster::load(&root)?;
        let accounts = AccountBook::load(&root)?;
        let resolved = resolver::resolve(&roster, &accounts, &query.staff_id);
        let sheet = DaySheet::load_or_new(&root, date)?;

        let mut accounts_map = Vec::new();
        for r in &resolved {
            let Some(account_id) = &r.account_id else {
                continue;
            };
            accounts_map.push(serde_json::json!({
                "account_id": account_id,
                "persona_id": r.persona_id,
                "account": accounts.get(account_id)?,
                "persona": roster.persona(&r.persona_id)?,
            }));
        }

        Ok::<_, opsroom_core::OpsError>(serde_json::json!({
            "date": date,
            "staff_id": query.staff_id,
            "tasks": sheet.tasks_for_staff(&query.staff_id),
            "accounts_map": accounts_map,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// GET /api/runbook/matrix — (time block × persona) projection of a day.
pub async fn matrix(
    State(app): State<AppState>,
    Query(query): Query<RunbookQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let date = parse_date(query.date.as_deref())?;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let m = runbook::matrix(&root, &query.staff_id, date)?;
        let value = serde_json::to_value(&m)?;
        Ok::<_, opsroom_core::OpsError>(value)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct GenerateBody {
    pub staff_id: String,
    #[serde(default)]
    pub date: Option<String>,
}

/// POST /api/runbook/generate-daily — expand templates into work tasks
/// for one staff member and date. Safe to retry: generation is idempotent
/// and the write lock serializes double-submission.
pub async fn generate_daily(
    State(app): State<AppState>,
    Json(body): Json<GenerateBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let date = parse_date(body.date.as_deref())?;
    let _guard = app.write_lock.lock().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let outcome = runbook::generate(&root, &body.staff_id, date)?;
        let value = serde_json::to_value(&outcome)?;
        Ok::<_, opsroom_core::OpsError>(value)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
