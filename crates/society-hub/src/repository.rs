use std::fmt;
use std::hash::Hash;

use crate::domain::{
    BillId, Complaint, ComplaintId, Event, EventId, MaintenanceBill, SocietyId, Unit, UnitId,
    Visitor, VisitorId,
};

/// Tenant-scoped entity that can be handed to a [`Repository`].
pub trait Record: Clone + Send + Sync + 'static {
    type Id: Clone + Eq + Hash + fmt::Display + Send + Sync;

    const KIND: &'static str;

    fn id(&self) -> &Self::Id;
    fn society_id(&self) -> &SocietyId;
}

/// Storage abstraction for the persistence collaborator.
///
/// Every read is partitioned by society; a record stored under another society is
/// indistinguishable from a missing one. `update` is last-write-wins.
pub trait Repository<T: Record>: Send + Sync {
    fn insert(&self, record: T) -> Result<T, RepositoryError>;
    fn update(&self, record: T) -> Result<(), RepositoryError>;
    fn fetch(&self, society: &SocietyId, id: &T::Id) -> Result<Option<T>, RepositoryError>;
    fn list(&self, society: &SocietyId) -> Result<Vec<T>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

impl Record for Unit {
    type Id = UnitId;
    const KIND: &'static str = "unit";

    fn id(&self) -> &UnitId {
        &self.id
    }

    fn society_id(&self) -> &SocietyId {
        &self.society_id
    }
}

impl Record for MaintenanceBill {
    type Id = BillId;
    const KIND: &'static str = "bill";

    fn id(&self) -> &BillId {
        &self.id
    }

    fn society_id(&self) -> &SocietyId {
        &self.society_id
    }
}

impl Record for Complaint {
    type Id = ComplaintId;
    const KIND: &'static str = "complaint";

    fn id(&self) -> &ComplaintId {
        &self.id
    }

    fn society_id(&self) -> &SocietyId {
        &self.society_id
    }
}

impl Record for Visitor {
    type Id = VisitorId;
    const KIND: &'static str = "visitor";

    fn id(&self) -> &VisitorId {
        &self.id
    }

    fn society_id(&self) -> &SocietyId {
        &self.society_id
    }
}

impl Record for Event {
    type Id = EventId;
    const KIND: &'static str = "event";

    fn id(&self) -> &EventId {
        &self.id
    }

    fn society_id(&self) -> &SocietyId {
        &self.society_id
    }
}
