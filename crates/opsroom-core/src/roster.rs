use crate::error::{OpsError, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: String,
    pub name: String,
}

/// A virtual identity content is produced under, independent of which
/// staff member or platform account currently operates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
}

/// Explicit persona→staff assignment. This is the authoritative ownership
/// record: the resolver and the onboarding preconditions both read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub staff_id: String,
    pub persona_id: String,
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub staff: Vec<Staff>,
    #[serde(default)]
    pub personas: Vec<Persona>,
    #[serde(default)]
    pub assignments: Vec<Assignment>,
}

impl Roster {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::roster_path(root);
        if !path.exists() {
            return Err(OpsError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let roster: Roster = serde_yaml::from_str(&data)?;
        Ok(roster)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::roster_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    // ---------------------------------------------------------------------------
    // Lookups
    // ---------------------------------------------------------------------------

    pub fn staff(&self, id: &str) -> Result<&Staff> {
        self.staff
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| OpsError::StaffNotFound(id.to_string()))
    }

    pub fn persona(&self, id: &str) -> Result<&Persona> {
        self.personas
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| OpsError::PersonaNotFound(id.to_string()))
    }

    pub fn has_staff(&self, id: &str) -> bool {
        self.staff.iter().any(|s| s.id == id)
    }

    /// Personas explicitly assigned to a staff member, in roster order.
    pub fn personas_for(&self, staff_id: &str) -> Vec<&Persona> {
        self.assignments
            .iter()
            .filter(|a| a.staff_id == staff_id)
            .filter_map(|a| self.personas.iter().find(|p| p.id == a.persona_id))
            .collect()
    }

    pub fn is_assigned(&self, staff_id: &str, persona_id: &str) -> bool {
        self.assignments
            .iter()
            .any(|a| a.staff_id == staff_id && a.persona_id == persona_id)
    }

    // ---------------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------------

    pub fn add_staff(&mut self, id: impl Into<String>, name: impl Into<String>) -> Result<()> {
        let id = id.into();
        paths::validate_id(&id)?;
        if self.has_staff(&id) {
            return Err(OpsError::PreconditionFailed(format!(
                "staff '{id}' already exists"
            )));
        }
        self.staff.push(Staff {
            id,
            name: name.into(),
        });
        Ok(())
    }

    pub fn add_persona(&mut self, id: impl Into<String>, name: impl Into<String>) -> Result<()> {
        let id = id.into();
        paths::validate_id(&id)?;
        if self.personas.iter().any(|p| p.id == id) {
            return Err(OpsError::PreconditionFailed(format!(
                "persona '{id}' already exists"
            )));
        }
        self.personas.push(Persona {
            id,
            name: name.into(),
        });
        Ok(())
    }

    /// Record a persona→staff assignment. Both sides must exist; the pair
    /// is stored once.
    pub fn assign(&mut self, staff_id: &str, persona_id: &str) -> Result<()> {
        self.staff(staff_id)?;
        self.persona(persona_id)?;
        let pair = Assignment {
            staff_id: staff_id.to_string(),
            persona_id: persona_id.to_string(),
        };
        if !self.assignments.contains(&pair) {
            self.assignments.push(pair);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
