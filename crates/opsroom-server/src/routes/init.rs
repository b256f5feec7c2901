use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

#[derive(serde::Deserialize)]
pub struct InitBody {
    pub project: String,
}

/// POST /api/init — bootstrap the .opsroom directory.
pub async fn init_workspace(
    State(app): State<AppState>,
    Json(body): Json<InitBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _guard = app.write_lock.lock().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let config = opsroom_core::workspace::init(&root, &body.project)?;
        Ok::<_, opsroom_core::OpsError>(serde_json::json!({
            "project": config.project,
            "initialized": true,
        }))
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}
