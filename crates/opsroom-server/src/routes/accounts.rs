use axum::extract::{Path, State};
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;
use opsroom_core::account::{Account, AccountBook};
use opsroom_core::onboarding;
use opsroom_core::roster::Roster;

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/accounts — list all accounts.
pub async fn list_accounts(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let book = AccountBook::load(&root)?;
        let value = serde_json::to_value(&book.accounts)?;
        Ok::<_, opsroom_core::OpsError>(value)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

#[derive(serde::Deserialize)]
pub struct CreateAccountBody {
    pub id: String,
    pub platform: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
}

/// POST /api/accounts — register a freshly created platform account.
pub async fn create_account(
    State(app): State<AppState>,
    Json(body): Json<CreateAccountBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let _guard = app.write_lock.lock().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        if let Some(staff_id) = &body.assigned_to {
            Roster::load(&root)?.staff(staff_id)?;
        }
        let mut book = AccountBook::load(&root)?;
        let account = Account::new(body.id.clone(), body.platform, body.assigned_to);
        book.add(account)?;
        book.save(&root)?;
        let value = serde_json::to_value(book.get(&body.id)?)?;
        Ok::<_, opsroom_core::OpsError>(value)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

// ---------------------------------------------------------------------------
// Onboarding transitions
// ---------------------------------------------------------------------------

/// Run one onboarding transition against the stored account and persist
/// the result. The response carries the authoritative post-write account.
async fn advance<F>(app: AppState, id: String, step: F) -> Result<Json<serde_json::Value>, AppError>
where
    F: FnOnce(&mut Account, &Roster) -> opsroom_core::Result<()> + Send + 'static,
{
    let _guard = app.write_lock.lock().await;
    let root = app.root.clone();
    let result = tokio::task::spawn_blocking(move || {
        let roster = Roster::load(&root)?;
        let mut book = AccountBook::load(&root)?;
        let account = book.get_mut(&id)?;
        step(account, &roster)?;
        book.save(&root)?;
        let value = serde_json::to_value(book.get(&id)?)?;
        Ok::<_, opsroom_core::OpsError>(value)
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    Ok(Json(result))
}

/// POST /api/accounts/:id/notify — assigned → notified.
pub async fn notify(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    advance(app, id, |account, _| onboarding::notify(account)).await
}

/// POST /api/accounts/:id/begin-binding — notified → binding.
pub async fn begin_binding(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    advance(app, id, |account, _| onboarding::begin_binding(account)).await
}

/// POST /api/accounts/:id/confirm-binding — binding → setting_persona.
pub async fn confirm_binding(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    advance(app, id, onboarding::confirm_binding).await
}

#[derive(serde::Deserialize)]
pub struct BindBody {
    pub persona_id: String,
}

/// POST /api/accounts/:id/bind — setting_persona → completed; binds the
/// persona and makes the account schedulable.
pub async fn bind_persona(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<BindBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    advance(app, id, move |account, roster| {
        onboarding::bind_persona(account, roster, &body.persona_id)
    })
    .await
}
