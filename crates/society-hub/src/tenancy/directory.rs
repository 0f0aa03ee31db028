use serde::{Deserialize, Serialize};

use crate::domain::{Principal, Society, SocietyId, UserRole};
use crate::repository::RepositoryError;

/// Resolution state reported by the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityState {
    /// The provider has not answered yet.
    Pending,
    SignedIn(Principal),
    SignedOut,
}

pub trait IdentityProvider: Send + Sync {
    fn current(&self) -> IdentityState;
}

/// Backend-owned facts about a principal's place in a society.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub role: UserRole,
    #[serde(default)]
    pub society_id: Option<SocietyId>,
    #[serde(default)]
    pub unit_number: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Lookup of the societies a principal may switch between.
pub trait SocietyDirectory: Send + Sync {
    fn societies_for(&self, principal: &Principal) -> Result<Vec<Society>, RepositoryError>;
    fn membership_for(&self, principal: &Principal)
        -> Result<Option<Membership>, RepositoryError>;
}
