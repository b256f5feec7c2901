use crate::account::Account;
use crate::error::{OpsError, Result};
use crate::roster::Roster;
use crate::types::OnboardingStatus;

// ---------------------------------------------------------------------------
// Transition guard
// ---------------------------------------------------------------------------

fn require_state(account: &Account, from: OnboardingStatus, to: OnboardingStatus) -> Result<()> {
    if account.onboarding_status != from {
        return Err(OpsError::InvalidTransition {
            from: account.onboarding_status.to_string(),
            to: to.to_string(),
            reason: format!("account '{}' must be in state '{from}'", account.id),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// `assigned → notified`: fires when the responsible staff member is told
/// about the account. Requires an owner to notify.
pub fn notify(account: &mut Account) -> Result<()> {
    require_state(account, OnboardingStatus::Assigned, OnboardingStatus::Notified)?;
    if account.assigned_to.is_none() {
        return Err(OpsError::PreconditionFailed(format!(
            "account '{}' has no assigned staff member to notify",
            account.id
        )));
    }
    account.onboarding_status = OnboardingStatus::Notified;
    account.touch();
    Ok(())
}

/// `notified → binding`: staff acknowledges and begins the platform
/// connection step. No external call is modeled; the confirmation itself
/// advances the state.
pub fn begin_binding(account: &mut Account) -> Result<()> {
    require_state(account, OnboardingStatus::Notified, OnboardingStatus::Binding)?;
    account.onboarding_status = OnboardingStatus::Binding;
    account.touch();
    Ok(())
}

/// `binding → setting_persona`: hard precondition — the staff member must
/// already own at least one persona, otherwise there is nothing to bind
/// and the caller must surface an empty state instead of progressing.
pub fn confirm_binding(account: &mut Account, roster: &Roster) -> Result<()> {
    require_state(
        account,
        OnboardingStatus::Binding,
        OnboardingStatus::SettingPersona,
    )?;
    let staff_id = account.assigned_to.as_deref().ok_or_else(|| {
        OpsError::PreconditionFailed(format!("account '{}' has no assigned staff member", account.id))
    })?;
    if roster.personas_for(staff_id).is_empty() {
        return Err(OpsError::PreconditionFailed(format!(
            "staff '{staff_id}' has no assigned personas: assign a persona first"
        )));
    }
    account.onboarding_status = OnboardingStatus::SettingPersona;
    account.touch();
    Ok(())
}

/// `setting_persona → completed`: binds the selected persona and makes the
/// account visible to the assignment resolver. The persona must be one of
/// the staff member's own.
pub fn bind_persona(account: &mut Account, roster: &Roster, persona_id: &str) -> Result<()> {
    require_state(
        account,
        OnboardingStatus::SettingPersona,
        OnboardingStatus::Completed,
    )?;
    roster.persona(persona_id)?;
    let staff_id = account.assigned_to.as_deref().ok_or_else(|| {
        OpsError::PreconditionFailed(format!("account '{}' has no assigned staff member", account.id))
    })?;
    if !roster.is_assigned(staff_id, persona_id) {
        return Err(OpsError::PreconditionFailed(format!(
            "persona '{persona_id}' is not assigned to staff '{staff_id}'"
        )));
    }
    account.persona_id = Some(persona_id.to_string());
    account.onboarding_status = OnboardingStatus::Completed;
    account.touch();
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
