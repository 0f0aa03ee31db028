use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::domain::{
    BillId, BillStatus, Complaint, Event, MaintenanceBill, Principal, Society, SocietyId,
    SocietyPlan, Unit, UnitId, UnitKind, User, UserId, UserRole, Visitor,
};
use crate::repository::{Record, Repository, RepositoryError};
use crate::router::{society_router, HubState};
use crate::service::{Repositories, SocietyService};
use crate::tenancy::{
    IdentityProvider, IdentityState, Membership, SocietyDirectory, TenantContext,
};

pub(super) fn green_valley() -> SocietyId {
    SocietyId::new("society-green-valley")
}

pub(super) fn sunset() -> SocietyId {
    SocietyId::new("society-sunset")
}

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 20, 10, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn today() -> NaiveDate {
    now().date_naive()
}

pub(super) fn society(id: SocietyId, name: &str, total_units: u32) -> Society {
    Society {
        id,
        name: name.to_string(),
        address: "123 Main Street, Springfield".to_string(),
        logo: None,
        primary_color: "#2563EB".to_string(),
        secondary_color: "#10B981".to_string(),
        total_units,
        created_at: Utc
            .with_ymd_and_hms(2024, 1, 15, 0, 0, 0)
            .single()
            .expect("valid timestamp"),
        plan: SocietyPlan::Premium,
    }
}

pub(super) fn unit(society_id: SocietyId, id: &str, number: &str, owner: &str) -> Unit {
    Unit {
        id: UnitId::new(id),
        society_id,
        number: number.to_string(),
        kind: UnitKind::Apartment,
        owner_name: owner.to_string(),
        owner_contact: "+1 (555) 123-4567".to_string(),
        residents: vec![User {
            id: UserId::new(format!("resident-{id}")),
            email: format!("{id}@example.com"),
            name: owner.to_string(),
            role: UserRole::Resident,
            society_id: None,
            unit_number: Some(number.to_string()),
            phone: None,
            avatar: None,
        }],
        maintenance_balance: 0,
    }
}

pub(super) fn bill(
    society_id: SocietyId,
    id: &str,
    unit_id: &str,
    due: NaiveDate,
    status: BillStatus,
    paid_on: Option<NaiveDate>,
) -> MaintenanceBill {
    MaintenanceBill {
        id: BillId::new(id),
        society_id,
        unit_id: UnitId::new(unit_id),
        amount: 4500,
        due_date: due,
        status,
        description: "Monthly Maintenance - November 2024".to_string(),
        created_at: Utc
            .with_ymd_and_hms(2024, 11, 1, 0, 0, 0)
            .single()
            .expect("valid timestamp"),
        paid_on,
    }
}

pub(super) fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn admin() -> Principal {
    Principal {
        id: UserId::new("user-admin"),
        email: Some("admin@greenvalley.com".to_string()),
        display_name: Some("Admin User".to_string()),
    }
}

#[derive(Clone)]
pub(super) struct MemoryRepository<T: Record> {
    pub(super) records: Arc<Mutex<BTreeMap<(SocietyId, String), T>>>,
}

impl<T: Record> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self {
            records: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

impl<T: Record> MemoryRepository<T> {
    pub(super) fn seeded(records: Vec<T>) -> Self {
        let repository = Self::default();
        for record in records {
            repository.insert(record).expect("seed record");
        }
        repository
    }

    fn key(society: &SocietyId, id: &T::Id) -> (SocietyId, String) {
        (society.clone(), id.to_string())
    }
}

impl<T: Record> Repository<T> for MemoryRepository<T> {
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
        guard.insert(Self::key(record.society_id(), record.id()), record);
        Ok(())
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

pub(super) struct UnavailableRepository;

impl<T: Record> Repository<T> for UnavailableRepository {
    fn insert(&self, _record: T) -> Result<T, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: T) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _society: &SocietyId, _id: &T::Id) -> Result<Option<T>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self, _society: &SocietyId) -> Result<Vec<T>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct StaticDirectory {
    pub(super) societies: Vec<Society>,
    pub(super) membership: Option<Membership>,
}

impl StaticDirectory {
    pub(super) fn two_societies() -> Self {
        Self {
            societies: vec![
                society(green_valley(), "Green Valley Apartments", 120),
                society(sunset(), "Sunset Residency", 80),
            ],
            membership: Some(Membership {
                role: UserRole::Admin,
                society_id: Some(green_valley()),
                unit_number: None,
                phone: Some("+1 (555) 123-4567".to_string()),
                avatar: None,
            }),
        }
    }
}

impl SocietyDirectory for StaticDirectory {
    fn societies_for(&self, _principal: &Principal) -> Result<Vec<Society>, RepositoryError> {
        Ok(self.societies.clone())
    }

    fn membership_for(
        &self,
        _principal: &Principal,
    ) -> Result<Option<Membership>, RepositoryError> {
        Ok(self.membership.clone())
    }
}

pub(super) struct FixedIdentity(pub(super) IdentityState);

impl IdentityProvider for FixedIdentity {
    fn current(&self) -> IdentityState {
        self.0.clone()
    }
}

pub(super) fn signed_in_context() -> TenantContext {
    let mut context = TenantContext::new();
    context
        .sign_in(admin(), &StaticDirectory::two_societies())
        .expect("sign in succeeds");
    context
}

pub(super) struct Fixture {
    pub(super) service: SocietyService,
    pub(super) units: Arc<MemoryRepository<Unit>>,
    pub(super) bills: Arc<MemoryRepository<MaintenanceBill>>,
    pub(super) complaints: Arc<MemoryRepository<Complaint>>,
    pub(super) visitors: Arc<MemoryRepository<Visitor>>,
    pub(super) events: Arc<MemoryRepository<Event>>,
}

/// Four bills in green valley (paid, pending, overdue-by-date, pending) and one in sunset.
pub(super) fn build_fixture() -> Fixture {
    let units = Arc::new(MemoryRepository::seeded(vec![
        unit(green_valley(), "unit-a101", "A-101", "John Smith"),
        unit(green_valley(), "unit-b205", "B-205", "Sarah Johnson"),
        unit(green_valley(), "unit-c304", "C-304", "Michael Brown"),
        unit(green_valley(), "unit-d102", "D-102", "Emily Davis"),
        unit(sunset(), "unit-s1", "S-1", "Priya Patel"),
    ]));
    let bills = Arc::new(MemoryRepository::seeded(vec![
        bill(
            green_valley(),
            "bill-1",
            "unit-a101",
            date(2024, 11, 15),
            BillStatus::Paid,
            Some(date(2024, 11, 10)),
        ),
        bill(
            green_valley(),
            "bill-2",
            "unit-b205",
            date(2024, 11, 25),
            BillStatus::Pending,
            None,
        ),
        bill(
            green_valley(),
            "bill-3",
            "unit-c304",
            date(2024, 11, 5),
            BillStatus::Pending,
            None,
        ),
        bill(
            green_valley(),
            "bill-4",
            "unit-d102",
            date(2024, 11, 30),
            BillStatus::Pending,
            None,
        ),
        bill(
            sunset(),
            "bill-s1",
            "unit-s1",
            date(2024, 11, 15),
            BillStatus::Paid,
            Some(date(2024, 11, 2)),
        ),
    ]));
    let complaints = Arc::new(MemoryRepository::default());
    let visitors = Arc::new(MemoryRepository::default());
    let events = Arc::new(MemoryRepository::default());

    let service = SocietyService::new(Repositories {
        units: units.clone(),
        bills: bills.clone(),
        complaints: complaints.clone(),
        visitors: visitors.clone(),
        events: events.clone(),
    });

    Fixture {
        service,
        units,
        bills,
        complaints,
        visitors,
        events,
    }
}

pub(super) fn router_with(service: SocietyService, context: TenantContext) -> axum::Router {
    let state = HubState::new(Arc::new(service), Arc::new(RwLock::new(context))).with_clock(now);
    society_router(state)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
