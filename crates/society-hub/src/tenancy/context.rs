use serde::Serialize;
use tracing::{debug, info};

use super::directory::{IdentityProvider, IdentityState, SocietyDirectory};
use crate::domain::{
    Principal, Society, SocietyId, SocietyUpdate, User, UserRole, ValidationError,
};
use crate::repository::RepositoryError;

const FALLBACK_USER_NAME: &str = "User";

/// Per-session tenant state: who is signed in and which society they are looking at.
///
/// Created in the loading phase, activated once identity and the society list are
/// resolved, and torn down on sign-out. Every tenant-scoped read goes through
/// [`TenantContext::require_society`].
#[derive(Debug, Clone, Default)]
pub struct TenantContext {
    phase: Phase,
}

#[derive(Debug, Clone, Default)]
enum Phase {
    #[default]
    Loading,
    Active(ActiveTenant),
    SignedOut,
}

#[derive(Debug, Clone)]
struct ActiveTenant {
    user: User,
    societies: Vec<Society>,
    current: Option<SocietyId>,
}

impl ActiveTenant {
    fn current_society(&self) -> Option<&Society> {
        let current = self.current.as_ref()?;
        self.societies.iter().find(|society| &society.id == current)
    }
}

impl TenantContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// True until the identity provider and directory have both answered.
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    pub fn is_signed_out(&self) -> bool {
        matches!(self.phase, Phase::SignedOut)
    }

    /// Reconcile the session with whatever the identity provider currently reports.
    pub fn refresh<I, D>(&mut self, identity: &I, directory: &D) -> Result<(), ContextError>
    where
        I: IdentityProvider + ?Sized,
        D: SocietyDirectory + ?Sized,
    {
        match identity.current() {
            IdentityState::Pending => Ok(()),
            IdentityState::SignedOut => {
                self.sign_out();
                Ok(())
            }
            IdentityState::SignedIn(principal) => {
                if self.current_user().is_some_and(|user| user.id == principal.id) {
                    return Ok(());
                }
                self.sign_in(principal, directory)
            }
        }
    }

    /// Resolve the principal's societies and membership and activate the session.
    ///
    /// On failure the previous phase is left untouched.
    pub fn sign_in<D>(&mut self, principal: Principal, directory: &D) -> Result<(), ContextError>
    where
        D: SocietyDirectory + ?Sized,
    {
        let societies = directory.societies_for(&principal)?;
        let membership = directory.membership_for(&principal)?;

        let home = membership
            .as_ref()
            .and_then(|membership| membership.society_id.clone());
        if let Some(home) = &home {
            if !societies.iter().any(|society| &society.id == home) {
                return Err(ContextError::SocietyNotFound(home.clone()));
            }
        }

        let current = home
            .clone()
            .or_else(|| societies.first().map(|society| society.id.clone()));

        let user = User {
            id: principal.id,
            email: principal.email.unwrap_or_default(),
            name: principal
                .display_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| FALLBACK_USER_NAME.to_string()),
            role: membership
                .as_ref()
                .map(|membership| membership.role)
                .unwrap_or(UserRole::Resident),
            society_id: home,
            unit_number: membership
                .as_ref()
                .and_then(|membership| membership.unit_number.clone()),
            phone: membership
                .as_ref()
                .and_then(|membership| membership.phone.clone()),
            avatar: membership.and_then(|membership| membership.avatar),
        };

        info!(
            user = %user.id,
            role = user.role.label(),
            societies = societies.len(),
            current = ?current,
            "tenant session established"
        );

        self.phase = Phase::Active(ActiveTenant {
            user,
            societies,
            current,
        });
        Ok(())
    }

    pub fn sign_out(&mut self) {
        if let Phase::Active(active) = &self.phase {
            info!(user = %active.user.id, "tenant session closed");
        }
        self.phase = Phase::SignedOut;
    }

    pub fn current_user(&self) -> Option<&User> {
        match &self.phase {
            Phase::Active(active) => Some(&active.user),
            Phase::Loading | Phase::SignedOut => None,
        }
    }

    pub fn current_society(&self) -> Option<&Society> {
        match &self.phase {
            Phase::Active(active) => active.current_society(),
            Phase::Loading | Phase::SignedOut => None,
        }
    }

    pub fn societies(&self) -> &[Society] {
        match &self.phase {
            Phase::Active(active) => &active.societies,
            Phase::Loading | Phase::SignedOut => &[],
        }
    }

    /// The active society, or why there is none.
    pub fn require_society(&self) -> Result<&Society, ContextError> {
        match &self.phase {
            Phase::Active(active) => active
                .current_society()
                .ok_or(ContextError::NoActiveSociety),
            Phase::Loading | Phase::SignedOut => Err(ContextError::NotReady),
        }
    }

    /// Select another society from the session's list. Selecting the current one is a no-op.
    pub fn switch_society(&mut self, society_id: &SocietyId) -> Result<&Society, ContextError> {
        let active = self.active_mut()?;
        let society = active
            .societies
            .iter()
            .find(|society| &society.id == society_id)
            .ok_or_else(|| ContextError::SocietyNotFound(society_id.clone()))?;

        if active.current.as_ref() != Some(society_id) {
            debug!(user = %active.user.id, society = %society_id, "switched active society");
            active.current = Some(society.id.clone());
        }
        Ok(society)
    }

    /// Merge fields into the active society; the session list holds the only copy.
    pub fn update_society(&mut self, update: SocietyUpdate) -> Result<&Society, ContextError> {
        let active = self.active_mut()?;
        let current = active.current.clone().ok_or(ContextError::NoActiveSociety)?;
        let society = active
            .societies
            .iter_mut()
            .find(|society| society.id == current)
            .ok_or(ContextError::NoActiveSociety)?;

        society.apply(update)?;
        debug!(society = %society.id, "updated society settings");
        Ok(&*society)
    }

    pub fn view(&self) -> SessionView<'_> {
        SessionView {
            loading: self.is_loading(),
            user: self.current_user(),
            current_society: self.current_society(),
            societies: self.societies(),
        }
    }

    fn active_mut(&mut self) -> Result<&mut ActiveTenant, ContextError> {
        match &mut self.phase {
            Phase::Active(active) => Ok(active),
            Phase::Loading | Phase::SignedOut => Err(ContextError::NotReady),
        }
    }
}

/// Serializable snapshot of the session for the presentation layer.
#[derive(Debug, Serialize)]
pub struct SessionView<'a> {
    pub loading: bool,
    pub user: Option<&'a User>,
    pub current_society: Option<&'a Society>,
    pub societies: &'a [Society],
}

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("tenant session is not ready")]
    NotReady,
    #[error("society {0} not found")]
    SocietyNotFound(SocietyId),
    #[error("no society is selected")]
    NoActiveSociety,
    #[error(transparent)]
    Directory(#[from] RepositoryError),
    #[error("invalid society update: {0}")]
    InvalidUpdate(#[from] ValidationError),
}
