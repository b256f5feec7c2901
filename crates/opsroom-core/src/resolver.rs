use crate::account::AccountBook;
use crate::error::Result;
use crate::roster::Roster;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ResolvedAssignment
// ---------------------------------------------------------------------------

/// One (persona, account) pair a staff member is responsible for. A
/// persona with no schedulable account still resolves, with `account_id`
/// unset — it generates persona-scoped tasks but no account-scoped ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAssignment {
    pub persona_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve the (persona, account) set for a staff member.
///
/// Persona assignment is authoritative for ownership: every account bound
/// to an owned persona is in scope, and only accounts whose onboarding is
/// completed participate. An unknown staff id resolves to an empty set —
/// a defensive default, not an error.
pub fn resolve(roster: &Roster, accounts: &AccountBook, staff_id: &str) -> Vec<ResolvedAssignment> {
    let mut resolved = Vec::new();
    for persona in roster.personas_for(staff_id) {
        let bound = accounts.schedulable_for(&persona.id);
        if bound.is_empty() {
            resolved.push(ResolvedAssignment {
                persona_id: persona.id.clone(),
                account_id: None,
            });
        } else {
            for account in bound {
                resolved.push(ResolvedAssignment {
                    persona_id: persona.id.clone(),
                    account_id: Some(account.id.clone()),
                });
            }
        }
    }
    resolved
}

/// Convenience wrapper that loads the roster and account book from disk.
pub fn resolve_from(root: &Path, staff_id: &str) -> Result<Vec<ResolvedAssignment>> {
    let roster = Roster::load(root)?;
    let accounts = AccountBook::load(root)?;
    Ok(resolve(&roster, &accounts, staff_id))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
