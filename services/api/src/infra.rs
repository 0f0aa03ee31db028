use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use society_hub::domain::{Principal, Society, SocietyId, UserId};
use society_hub::repository::{Record, Repository, RepositoryError};
use society_hub::tenancy::{IdentityProvider, IdentityState, Membership, SocietyDirectory};
use society_hub::TenantContext;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) context: Arc<RwLock<TenantContext>>,
}

/// Process-local store for one entity kind, partitioned by society.
#[derive(Clone)]
pub(crate) struct InMemoryRepository<T: Record> {
    records: Arc<Mutex<HashMap<(SocietyId, String), T>>>,
}

impl<T: Record> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<T: Record> InMemoryRepository<T> {
    fn key(society: &SocietyId, id: &T::Id) -> (SocietyId, String) {
        (society.clone(), id.to_string())
    }

    pub(crate) fn len(&self) -> usize {
        self.records.lock().expect("repository mutex poisoned").len()
    }
}

impl<T: Record> Repository<T> for InMemoryRepository<T> {
    fn insert(&self, record: T) -> Result<T, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let key = Self::key(record.society_id(), record.id());
        if guard.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(key, record.clone());
        Ok(record)
    }

    fn update(&self, record: T) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let key = Self::key(record.society_id(), record.id());
        if guard.contains_key(&key) {
            guard.insert(key, record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, society: &SocietyId, id: &T::Id) -> Result<Option<T>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(&Self::key(society, id)).cloned())
    }

    fn list(&self, society: &SocietyId) -> Result<Vec<T>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .iter()
            .filter(|((owner, _), _)| owner == society)
            .map(|(_, record)| record.clone())
            .collect())
    }
}

/// Every principal may switch between all known societies; memberships are keyed by user.
#[derive(Default, Clone)]
pub(crate) struct InMemoryDirectory {
    societies: Vec<Society>,
    memberships: HashMap<UserId, Membership>,
}

impl InMemoryDirectory {
    pub(crate) fn new(societies: Vec<Society>) -> Self {
        Self {
            societies,
            memberships: HashMap::new(),
        }
    }

    pub(crate) fn with_membership(mut self, user: UserId, membership: Membership) -> Self {
        self.memberships.insert(user, membership);
        self
    }
}

impl SocietyDirectory for InMemoryDirectory {
    fn societies_for(&self, _principal: &Principal) -> Result<Vec<Society>, RepositoryError> {
        Ok(self.societies.clone())
    }

    fn membership_for(
        &self,
        principal: &Principal,
    ) -> Result<Option<Membership>, RepositoryError> {
        Ok(self.memberships.get(&principal.id).cloned())
    }
}

/// Identity fixed at startup from configuration.
pub(crate) struct ConfiguredIdentity {
    principal: Principal,
}

impl ConfiguredIdentity {
    pub(crate) fn new(principal: Principal) -> Self {
        Self { principal }
    }
}

impl IdentityProvider for ConfiguredIdentity {
    fn current(&self) -> IdentityState {
        IdentityState::SignedIn(self.principal.clone())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
