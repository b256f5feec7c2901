use crate::error::{OpsError, Result};
use crate::paths;
use crate::types::OnboardingStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// A platform account. `assigned_to` names the staff member responsible
/// during onboarding; once a persona is bound, persona assignment is the
/// authoritative ownership signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub platform: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub onboarding_status: OnboardingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(
        id: impl Into<String>,
        platform: impl Into<String>,
        assigned_to: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            platform: platform.into(),
            persona_id: None,
            assigned_to,
            onboarding_status: OnboardingStatus::Assigned,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// AccountBook
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountBook {
    #[serde(default)]
    pub accounts: Vec<Account>,
}

impl AccountBook {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::accounts_path(root);
        if !path.exists() {
            return Err(OpsError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let book: AccountBook = serde_yaml::from_str(&data)?;
        Ok(book)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::accounts_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn get(&self, id: &str) -> Result<&Account> {
        self.accounts
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| OpsError::AccountNotFound(id.to_string()))
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Account> {
        self.accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| OpsError::AccountNotFound(id.to_string()))
    }

    pub fn add(&mut self, account: Account) -> Result<()> {
        paths::validate_id(&account.id)?;
        if self.accounts.iter().any(|a| a.id == account.id) {
            return Err(OpsError::AccountExists(account.id));
        }
        self.accounts.push(account);
        Ok(())
    }

    /// Completed accounts bound to the given persona — the only accounts
    /// the assignment resolver may see.
    pub fn schedulable_for(&self, persona_id: &str) -> Vec<&Account> {
        self.accounts
            .iter()
            .filter(|a| a.persona_id.as_deref() == Some(persona_id))
            .filter(|a| a.onboarding_status == OnboardingStatus::Completed)
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
