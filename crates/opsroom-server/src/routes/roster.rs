use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;
use opsroom_core::roster::Roster;

/// GET /api/roster — staff, personas and assignments.
pub async fn get_roster(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let roster = Roster::load(&root)?;
        let value = serde_json::to_value(&roster)?;
        Ok::<_, opsroom_core::OpsError>(value)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct MemberBody {
    pub id: String,
    pub name: String,
}

/// POST /api/staff — add a staff member.
pub async fn add_staff(
    State(app): State<AppState>,
    Json(body): Json<MemberBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _guard = app.write_lock.lock().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut roster = Roster::load(&root)?;
        roster.add_staff(&body.id, &body.name)?;
        roster.save(&root)?;
        Ok::<_, opsroom_core::OpsError>(serde_json::json!({
            "id": body.id,
            "name": body.name,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/personas — add a persona.
pub async fn add_persona(
    State(app): State<AppState>,
    Json(body): Json<MemberBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _guard = app.write_lock.lock().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut roster = Roster::load(&root)?;
        roster.add_persona(&body.id, &body.name)?;
        roster.save(&root)?;
        Ok::<_, opsroom_core::OpsError>(serde_json::json!({
            "id": body.id,
            "name": body.name,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct AssignBody {
    pub staff_id: String,
    pub persona_id: String,
}

/// POST /api/assignments — assign a persona to a staff member.
pub async fn assign_persona(
    State(app): State<AppState>,
    Json(body): Json<AssignBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _guard = app.write_lock.lock().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let mut roster = Roster::load(&root)?;
        roster.assign(&body.staff_id, &body.persona_id)?;
        roster.save(&root)?;
        Ok::<_, opsroom_core::OpsError>(serde_json::json!({
            "staff_id": body.staff_id,
            "persona_id": body.persona_id,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
