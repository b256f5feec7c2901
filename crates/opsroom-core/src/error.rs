use thiserror::Error;

#[derive(Debug, Error)]
pub enum OpsError {
    #[error("not initialized: run 'opsroom init'")]
    NotInitialized,

    #[error("template not found: {0}")]
    TemplateNotFound(String),

    #[error("template already exists: {0}")]
    TemplateExists(String),

    #[error("task not found: {0}")]
    TaskNotFound(String),

    #[error("account not found: {0}")]
    AccountNotFound(String),

    #[error("account already exists: {0}")]
    AccountExists(String),

    #[error("staff not found: {0}")]
    StaffNotFound(String),

    #[error("persona not found: {0}")]
    PersonaNotFound(String),

    #[error("invalid id '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidId(String),

    #[error("invalid time slot '{0}': expected HH:MM")]
    InvalidTimeSlot(String),

    #[error("invalid template '{id}': {reason}")]
    InvalidTemplate { id: String, reason: String },

    #[error("frequency 'weekly' on template '{0}' is deprecated: migrate to weekly_custom with a single anchor day")]
    DeprecatedFrequency(String),

    #[error("invalid status: {0}")]
    InvalidStatus(String),

    #[error("invalid transition from {from} to {to}: {reason}")]
    InvalidTransition {
        from: String,
        to: String,
        reason: String,
    },

    #[error("precondition failed: {0}")]
    PreconditionFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OpsError>;
