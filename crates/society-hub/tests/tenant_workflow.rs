use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use society_hub::domain::{
    ComplaintCategory, ComplaintPriority, ComplaintStatus, NewComplaint, Principal, Society,
    SocietyId, SocietyPlan, Unit, UnitId, UnitKind, UserId, UserRole,
};
use society_hub::filters::ComplaintQuery;
use society_hub::repository::{Record, Repository, RepositoryError};
use society_hub::tenancy::{Membership, SocietyDirectory};
use society_hub::{Repositories, ServiceError, SocietyService, TenantContext};

struct Store<T: Record> {
    records: Mutex<HashMap<String, T>>,
}

impl<T: Record> Store<T> {
    fn new(records: Vec<T>) -> Self {
        Self {
            records: Mutex::new(
                records
                    .into_iter()
                    .map(|record| (record.id().to_string(), record))
                    .collect(),
            ),
        }
    }
}

impl<T: Record> Repository<T> for Store<T> {
    fn insert(&self, record: T) -> Result<T, RepositoryError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if guard.contains_key(&record.id().to_string()) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id().to_string(), record.clone());
        Ok(record)
    }

    fn update(&self, record: T) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        guard.insert(record.id().to_string(), record);
        Ok(())
    }

    fn fetch(&self, society: &SocietyId, id: &T::Id) -> Result<Option<T>, RepositoryError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .get(&id.to_string())
            .filter(|record| record.society_id() == society)
            .cloned())
    }

    fn list(&self, society: &SocietyId) -> Result<Vec<T>, RepositoryError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.society_id() == society)
            .cloned()
            .collect())
    }
}

struct Directory;

fn society(id: &str, name: &str) -> Society {
    Society {
        id: SocietyId::new(id),
        name: name.to_string(),
        address: "456 Oak Avenue, Springfield".to_string(),
        logo: None,
        primary_color: "#DC2626".to_string(),
        secondary_color: "#F59E0B".to_string(),
        total_units: 80,
        created_at: Utc
            .with_ymd_and_hms(2024, 2, 20, 0, 0, 0)
            .single()
            .expect("valid timestamp"),
        plan: SocietyPlan::Basic,
    }
}

impl SocietyDirectory for Directory {
    fn societies_for(&self, _principal: &Principal) -> Result<Vec<Society>, RepositoryError> {
        Ok(vec![
            society("1", "Green Valley Apartments"),
            society("2", "Sunset Residency"),
        ])
    }

    fn membership_for(
        &self,
        _principal: &Principal,
    ) -> Result<Option<Membership>, RepositoryError> {
        Ok(Some(Membership {
            role: UserRole::Manager,
            society_id: Some(SocietyId::new("2")),
            unit_number: None,
            phone: None,
            avatar: None,
        }))
    }
}

fn unit(society_id: &str, id: &str, number: &str) -> Unit {
    Unit {
        id: UnitId::new(id),
        society_id: SocietyId::new(society_id),
        number: number.to_string(),
        kind: UnitKind::Villa,
        owner_name: "Jane Doe".to_string(),
        owner_contact: "+1 (555) 222-3333".to_string(),
        residents: Vec::new(),
        maintenance_balance: 0,
    }
}

fn service() -> SocietyService {
    SocietyService::new(Repositories {
        units: Arc::new(Store::new(vec![
            unit("1", "unit-a101", "A-101"),
            unit("2", "unit-v7", "V-7"),
        ])),
        bills: Arc::new(Store::new(Vec::new())),
        complaints: Arc::new(Store::new(Vec::new())),
        visitors: Arc::new(Store::new(Vec::new())),
        events: Arc::new(Store::new(Vec::new())),
    })
}

fn complaint(unit_id: &str) -> NewComplaint {
    NewComplaint {
        unit_id: UnitId::new(unit_id),
        resident_id: UserId::new("jane"),
        category: ComplaintCategory::Security,
        title: "Gate left open overnight".to_string(),
        description: "The east gate was unlocked after midnight".to_string(),
        priority: ComplaintPriority::Urgent,
    }
}

#[test]
fn manager_lands_on_home_society_and_sees_only_its_records() {
    let service = service();
    let mut context = TenantContext::new();
    let principal = Principal {
        id: UserId::new("manager"),
        email: Some("manager@sunset.com".to_string()),
        display_name: Some("Sunset Manager".to_string()),
    };
    context.sign_in(principal, &Directory).expect("signed in");
    assert_eq!(
        context.current_society().map(|society| society.name.as_str()),
        Some("Sunset Residency")
    );

    let now = Utc
        .with_ymd_and_hms(2024, 11, 20, 9, 0, 0)
        .single()
        .expect("valid timestamp");
    service
        .file_complaint(&context, complaint("unit-v7"), now)
        .expect("filed in sunset");

    let foreign = service.file_complaint(&context, complaint("unit-a101"), now);
    assert!(matches!(foreign, Err(ServiceError::Validation(_))));

    let sunset = service
        .complaints(&context, &ComplaintQuery::default())
        .expect("overview");
    assert_eq!(sunset.summary.total, 1);
    assert_eq!(sunset.summary.urgent_open, 1);
    assert_eq!(sunset.complaints[0].complaint.status, ComplaintStatus::Open);

    context
        .switch_society(&SocietyId::new("1"))
        .expect("switch to green valley");
    let green_valley = service
        .complaints(&context, &ComplaintQuery::default())
        .expect("overview");
    assert_eq!(green_valley.summary.total, 0);
}
