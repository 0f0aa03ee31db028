use serde::{Deserialize, Serialize};

use super::{require_text, SocietyId, UnitId, User, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Apartment,
    Villa,
    Penthouse,
}

impl UnitKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Apartment => "Apartment",
            Self::Villa => "Villa",
            Self::Penthouse => "Penthouse",
        }
    }
}

/// A dwelling inside exactly one society.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub society_id: SocietyId,
    pub number: String,
    #[serde(rename = "type")]
    pub kind: UnitKind,
    pub owner_name: String,
    pub owner_contact: String,
    #[serde(default)]
    pub residents: Vec<User>,
    /// Outstanding maintenance dues; negative when the owner has paid ahead.
    pub maintenance_balance: i64,
}

impl Unit {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("number", &self.number)?;
        require_text("owner_name", &self.owner_name)?;
        Ok(())
    }
}
