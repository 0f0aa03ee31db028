use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregation::{
    attendance_ratio, checked_total_with, contribution_progress, BillingSummary, ComplaintSummary,
    DashboardSummary, EventSummary, TenantSnapshot, VisitorSummary,
};
use crate::domain::{
    BillId, BillUpdate, Complaint, ComplaintId, ComplaintUpdate, Event, EventId, EventStatus,
    MaintenanceBill, NewBill, NewComplaint, NewEvent, NewVisitor, Society, SocietyId, Unit,
    UnitId, ValidationError, Visitor, VisitorId, VisitorStatus,
};
use crate::filters::{BillQuery, ComplaintQuery, EventQuery, VisitorQuery};
use crate::lifecycle::LifecycleError;
use crate::repository::{Record, Repository, RepositoryError};
use crate::tenancy::{ContextError, TenantContext};

const DEFAULT_ACTIVITY_LIMIT: usize = 10;

static RECORD_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_id(prefix: &str) -> String {
    let id = RECORD_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id:06}")
}

/// Persistence collaborators, one per scoped entity.
#[derive(Clone)]
pub struct Repositories {
    pub units: Arc<dyn Repository<Unit>>,
    pub bills: Arc<dyn Repository<MaintenanceBill>>,
    pub complaints: Arc<dyn Repository<Complaint>>,
    pub visitors: Arc<dyn Repository<Visitor>>,
    pub events: Arc<dyn Repository<Event>>,
}

/// Tenant-scoped reads and writes.
///
/// Every call takes the session's [`TenantContext`] and only ever touches records
/// belonging to its active society. Writes are checked against the lifecycle rules
/// and re-validated before they reach the repository.
pub struct SocietyService {
    repositories: Repositories,
    activity_limit: usize,
}

impl SocietyService {
    pub fn new(repositories: Repositories) -> Self {
        Self {
            repositories,
            activity_limit: DEFAULT_ACTIVITY_LIMIT,
        }
    }

    pub fn with_activity_limit(mut self, limit: usize) -> Self {
        self.activity_limit = limit;
        self
    }

    pub fn units(&self, context: &TenantContext) -> Result<Vec<Unit>, ServiceError> {
        let society = context.require_society()?;
        let mut units = self.repositories.units.list(&society.id)?;
        units.sort_by(|a, b| a.number.cmp(&b.number));
        Ok(units)
    }

    pub fn billing(
        &self,
        context: &TenantContext,
        query: &BillQuery,
        today: NaiveDate,
    ) -> Result<BillingOverview, ServiceError> {
        let society = context.require_society()?;
        let units = self.repositories.units.list(&society.id)?;
        let bills = self.repositories.bills.list(&society.id)?;

        let summary = BillingSummary::from_bills(&bills, today);
        let mut views: Vec<BillView> = bills
            .iter()
            .filter_map(|bill| {
                let unit = find_unit(&units, &bill.unit_id);
                query
                    .matches(bill, unit, today)
                    .then(|| BillView::new(bill, unit, today))
            })
            .collect();
        views.sort_by(|a, b| {
            a.bill
                .due_date
                .cmp(&b.bill.due_date)
                .then_with(|| a.bill.id.cmp(&b.bill.id))
        });

        Ok(BillingOverview {
            summary,
            bills: views,
        })
    }

    pub fn create_bill(
        &self,
        context: &TenantContext,
        new_bill: NewBill,
        now: DateTime<Utc>,
    ) -> Result<MaintenanceBill, ServiceError> {
        let society = context.require_society()?;
        self.ensure_unit(&society.id, &new_bill.unit_id)?;

        let bill = new_bill.into_bill(BillId(next_id("bill")), society.id.clone(), now);
        bill.validate()?;
        let existing = self.repositories.bills.list(&society.id)?;
        if checked_total_with(&existing, bill.amount).is_none() {
            return Err(ValidationError::AmountOverflow {
                amount: bill.amount,
            }
            .into());
        }
        let stored = self.repositories.bills.insert(bill)?;

        info!(society = %society.id, bill = %stored.id, amount = stored.amount, "maintenance bill raised");
        Ok(stored)
    }

    pub fn update_bill(
        &self,
        context: &TenantContext,
        bill_id: &BillId,
        update: BillUpdate,
        today: NaiveDate,
    ) -> Result<MaintenanceBill, ServiceError> {
        let society = context.require_society()?;
        let mut bill = load(self.repositories.bills.as_ref(), society, bill_id)?;

        bill.apply(update, today).map_err(|err| rejected(society, bill_id, err))?;
        bill.validate()?;
        self.repositories.bills.update(bill.clone())?;

        info!(society = %society.id, bill = %bill.id, status = bill.status.label(), "bill status updated");
        Ok(bill)
    }

    pub fn complaints(
        &self,
        context: &TenantContext,
        query: &ComplaintQuery,
    ) -> Result<ComplaintOverview, ServiceError> {
        let society = context.require_society()?;
        let units = self.repositories.units.list(&society.id)?;
        let complaints = self.repositories.complaints.list(&society.id)?;

        let summary = ComplaintSummary::from_complaints(&complaints);
        let mut views: Vec<ComplaintView> = complaints
            .into_iter()
            .filter_map(|complaint| {
                let unit = find_unit(&units, &complaint.unit_id);
                query
                    .matches(&complaint, unit)
                    .then(|| ComplaintView::new(complaint, unit))
            })
            .collect();
        views.sort_by(|a, b| b.complaint.created_at.cmp(&a.complaint.created_at));

        Ok(ComplaintOverview {
            summary,
            complaints: views,
        })
    }

    pub fn file_complaint(
        &self,
        context: &TenantContext,
        new_complaint: NewComplaint,
        now: DateTime<Utc>,
    ) -> Result<Complaint, ServiceError> {
        let society = context.require_society()?;
        self.ensure_unit(&society.id, &new_complaint.unit_id)?;

        let complaint = new_complaint.into_complaint(
            ComplaintId(next_id("complaint")),
            society.id.clone(),
            now,
        );
        complaint.validate()?;
        let stored = self.repositories.complaints.insert(complaint)?;

        info!(
            society = %society.id,
            complaint = %stored.id,
            priority = stored.priority.label(),
            "complaint filed"
        );
        Ok(stored)
    }

    pub fn update_complaint(
        &self,
        context: &TenantContext,
        complaint_id: &ComplaintId,
        update: ComplaintUpdate,
    ) -> Result<Complaint, ServiceError> {
        let society = context.require_society()?;
        let mut complaint = load(self.repositories.complaints.as_ref(), society, complaint_id)?;

        complaint
            .apply(update)
            .map_err(|err| rejected(society, complaint_id, err))?;
        complaint.validate()?;
        self.repositories.complaints.update(complaint.clone())?;

        info!(
            society = %society.id,
            complaint = %complaint.id,
            status = complaint.status.label(),
            "complaint status updated"
        );
        Ok(complaint)
    }

    pub fn visitors(
        &self,
        context: &TenantContext,
        query: &VisitorQuery,
    ) -> Result<VisitorOverview, ServiceError> {
        let society = context.require_society()?;
        let units = self.repositories.units.list(&society.id)?;
        let visitors = self.repositories.visitors.list(&society.id)?;

        let summary = VisitorSummary::from_visitors(&visitors);
        let mut views: Vec<VisitorView> = visitors
            .into_iter()
            .filter_map(|visitor| {
                let unit = find_unit(&units, &visitor.unit_id);
                query
                    .matches(&visitor, unit)
                    .then(|| VisitorView::new(visitor, unit))
            })
            .collect();
        views.sort_by(|a, b| b.visitor.check_in_time.cmp(&a.visitor.check_in_time));

        Ok(VisitorOverview {
            summary,
            visitors: views,
        })
    }

    pub fn check_in_visitor(
        &self,
        context: &TenantContext,
        new_visitor: NewVisitor,
        now: DateTime<Utc>,
    ) -> Result<Visitor, ServiceError> {
        let society = context.require_society()?;
        self.ensure_unit(&society.id, &new_visitor.unit_id)?;

        let visitor =
            new_visitor.into_visitor(VisitorId(next_id("visitor")), society.id.clone(), now);
        visitor.validate()?;
        let stored = self.repositories.visitors.insert(visitor)?;

        info!(society = %society.id, visitor = %stored.id, unit = %stored.unit_id, "visitor checked in");
        Ok(stored)
    }

    pub fn check_out_visitor(
        &self,
        context: &TenantContext,
        visitor_id: &VisitorId,
        at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<Visitor, ServiceError> {
        let society = context.require_society()?;
        let mut visitor = load(self.repositories.visitors.as_ref(), society, visitor_id)?;

        visitor
            .check_out(at, notes)
            .map_err(|err| rejected(society, visitor_id, err))?;
        visitor.validate()?;
        self.repositories.visitors.update(visitor.clone())?;

        info!(society = %society.id, visitor = %visitor.id, "visitor checked out");
        Ok(visitor)
    }

    pub fn events(
        &self,
        context: &TenantContext,
        query: &EventQuery,
    ) -> Result<EventOverview, ServiceError> {
        let society = context.require_society()?;
        let events = self.repositories.events.list(&society.id)?;

        let summary = EventSummary::from_events(&events);
        let mut views: Vec<EventView> = events
            .into_iter()
            .filter(|event| query.matches(event))
            .map(EventView::new)
            .collect();
        views.sort_by(|a, b| a.event.date.cmp(&b.event.date));

        Ok(EventOverview {
            summary,
            events: views,
        })
    }

    pub fn schedule_event(
        &self,
        context: &TenantContext,
        new_event: NewEvent,
    ) -> Result<Event, ServiceError> {
        let society = context.require_society()?;

        let event = new_event.into_event(EventId(next_id("event")), society.id.clone());
        event.validate()?;
        let stored = self.repositories.events.insert(event)?;

        info!(society = %society.id, event = %stored.id, "event scheduled");
        Ok(stored)
    }

    pub fn update_event_status(
        &self,
        context: &TenantContext,
        event_id: &EventId,
        status: EventStatus,
    ) -> Result<Event, ServiceError> {
        self.modify_event(context, event_id, |event| event.transition(status))
    }

    pub fn register_attendee(
        &self,
        context: &TenantContext,
        event_id: &EventId,
        attendee: &str,
    ) -> Result<Event, ServiceError> {
        if attendee.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "attendee" }.into());
        }
        self.modify_event(context, event_id, |event| {
            event.register_attendee(attendee.trim()).map(|_| ())
        })
    }

    pub fn record_contribution(
        &self,
        context: &TenantContext,
        event_id: &EventId,
        amount: u64,
    ) -> Result<Event, ServiceError> {
        if amount == 0 {
            return Err(ValidationError::NonPositiveAmount.into());
        }
        self.modify_event(context, event_id, |event| event.record_contribution(amount))
    }

    pub fn dashboard(
        &self,
        context: &TenantContext,
        now: DateTime<Utc>,
    ) -> Result<DashboardSummary, ServiceError> {
        let society = context.require_society()?;
        let units = self.repositories.units.list(&society.id)?;
        let bills = self.repositories.bills.list(&society.id)?;
        let complaints = self.repositories.complaints.list(&society.id)?;
        let visitors = self.repositories.visitors.list(&society.id)?;
        let events = self.repositories.events.list(&society.id)?;

        let snapshot = TenantSnapshot {
            units: &units,
            bills: &bills,
            complaints: &complaints,
            visitors: &visitors,
            events: &events,
        };
        Ok(DashboardSummary::build(
            society,
            &snapshot,
            now,
            self.activity_limit,
        ))
    }

    fn modify_event<F>(
        &self,
        context: &TenantContext,
        event_id: &EventId,
        change: F,
    ) -> Result<Event, ServiceError>
    where
        F: FnOnce(&mut Event) -> Result<(), LifecycleError>,
    {
        let society = context.require_society()?;
        let mut event = load(self.repositories.events.as_ref(), society, event_id)?;

        change(&mut event).map_err(|err| rejected(society, event_id, err))?;
        event.validate()?;
        self.repositories.events.update(event.clone())?;

        info!(
            society = %society.id,
            event = %event.id,
            status = event.status.label(),
            attendees = event.attendees.len(),
            "event updated"
        );
        Ok(event)
    }

    fn ensure_unit(&self, society_id: &SocietyId, unit_id: &UnitId) -> Result<(), ServiceError> {
        match self.repositories.units.fetch(society_id, unit_id)? {
            Some(_) => Ok(()),
            None => Err(ValidationError::UnknownUnit(unit_id.clone()).into()),
        }
    }
}

fn load<T: Record>(
    repository: &dyn Repository<T>,
    society: &Society,
    id: &T::Id,
) -> Result<T, ServiceError> {
    repository
        .fetch(&society.id, id)?
        .ok_or_else(|| RepositoryError::NotFound.into())
}

fn rejected(society: &Society, id: &impl std::fmt::Display, err: LifecycleError) -> LifecycleError {
    warn!(society = %society.id, record = %id, error = %err, "rejected status write");
    err
}

fn find_unit<'a>(units: &'a [Unit], unit_id: &UnitId) -> Option<&'a Unit> {
    units.iter().find(|unit| &unit.id == unit_id)
}

/// Bill as read by the presentation layer, with status recomputed for the read date.
#[derive(Debug, Clone, Serialize)]
pub struct BillView {
    #[serde(flatten)]
    pub bill: MaintenanceBill,
    pub status_label: &'static str,
    pub unit_number: Option<String>,
    pub owner_name: Option<String>,
}

impl BillView {
    fn new(bill: &MaintenanceBill, unit: Option<&Unit>, today: NaiveDate) -> Self {
        let mut bill = bill.clone();
        bill.status = bill.effective_status(today);
        Self {
            status_label: bill.status.label(),
            bill,
            unit_number: unit.map(|unit| unit.number.clone()),
            owner_name: unit.map(|unit| unit.owner_name.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplaintView {
    #[serde(flatten)]
    pub complaint: Complaint,
    pub status_label: &'static str,
    pub priority_label: &'static str,
    pub category_label: &'static str,
    pub unit_number: Option<String>,
}

impl ComplaintView {
    fn new(complaint: Complaint, unit: Option<&Unit>) -> Self {
        Self {
            status_label: complaint.status.label(),
            priority_label: complaint.priority.label(),
            category_label: complaint.category.label(),
            unit_number: unit.map(|unit| unit.number.clone()),
            complaint,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VisitorView {
    #[serde(flatten)]
    pub visitor: Visitor,
    pub status: VisitorStatus,
    pub status_label: &'static str,
    pub unit_number: Option<String>,
}

impl VisitorView {
    fn new(visitor: Visitor, unit: Option<&Unit>) -> Self {
        let status = visitor.status();
        Self {
            status,
            status_label: status.label(),
            unit_number: unit.map(|unit| unit.number.clone()),
            visitor,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub status_label: &'static str,
    pub category_label: &'static str,
    pub contribution_progress: Option<f64>,
    pub attendance_ratio: Option<f64>,
}

impl EventView {
    fn new(event: Event) -> Self {
        Self {
            status_label: event.status.label(),
            category_label: event.category.label(),
            contribution_progress: contribution_progress(&event),
            attendance_ratio: attendance_ratio(&event),
            event,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BillingOverview {
    pub summary: BillingSummary,
    pub bills: Vec<BillView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComplaintOverview {
    pub summary: ComplaintSummary,
    pub complaints: Vec<ComplaintView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VisitorOverview {
    pub summary: VisitorSummary,
    pub visitors: Vec<VisitorView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventOverview {
    pub summary: EventSummary,
    pub events: Vec<EventView>,
}

/// Error raised by the society service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
