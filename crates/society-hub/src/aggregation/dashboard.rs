use chrono::{DateTime, NaiveTime, Utc};
use serde::Serialize;

use super::billing::{collected_in_month, collection_rate};
use super::complaints::pending_count;
use super::events::count_with_status as events_with_status;
use super::visitors::count_with_status as visitors_with_status;
use crate::domain::{
    BillStatus, Complaint, Event, EventStatus, MaintenanceBill, Society, SocietyId, Unit,
    UnitId, Visitor, VisitorStatus,
};

/// Borrowed view of everything stored for one society.
#[derive(Debug, Clone, Copy)]
pub struct TenantSnapshot<'a> {
    pub units: &'a [Unit],
    pub bills: &'a [MaintenanceBill],
    pub complaints: &'a [Complaint],
    pub visitors: &'a [Visitor],
    pub events: &'a [Event],
}

impl TenantSnapshot<'_> {
    /// Display number for a unit, falling back to its id.
    pub fn unit_number(&self, unit_id: &UnitId) -> String {
        self.units
            .iter()
            .find(|unit| &unit.id == unit_id)
            .map(|unit| unit.number.clone())
            .unwrap_or_else(|| unit_id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Payment,
    Complaint,
    Visitor,
    Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityTone {
    Success,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub tone: ActivityTone,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Newest-first feed of payments, filed complaints, gate check-ins and held events.
///
/// Entries timestamped after `now` are left out.
pub fn recent_activity(
    snapshot: &TenantSnapshot<'_>,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<ActivityEntry> {
    let mut entries = Vec::new();

    for bill in snapshot.bills {
        if let (BillStatus::Paid, Some(paid_on)) = (bill.status, bill.paid_on) {
            entries.push(ActivityEntry {
                kind: ActivityKind::Payment,
                tone: ActivityTone::Success,
                message: format!(
                    "Maintenance payment received from Unit {}",
                    snapshot.unit_number(&bill.unit_id)
                ),
                at: paid_on.and_time(NaiveTime::MIN).and_utc(),
            });
        }
    }

    for complaint in snapshot.complaints {
        entries.push(ActivityEntry {
            kind: ActivityKind::Complaint,
            tone: ActivityTone::Warning,
            message: format!(
                "New complaint filed: {} in {}",
                complaint.title,
                snapshot.unit_number(&complaint.unit_id)
            ),
            at: complaint.created_at,
        });
    }

    for visitor in snapshot.visitors {
        entries.push(ActivityEntry {
            kind: ActivityKind::Visitor,
            tone: ActivityTone::Info,
            message: format!(
                "Visitor check-in: {} visiting {}",
                visitor.name,
                snapshot.unit_number(&visitor.unit_id)
            ),
            at: visitor.check_in_time,
        });
    }

    for event in snapshot.events {
        if matches!(event.status, EventStatus::Ongoing | EventStatus::Completed) {
            entries.push(ActivityEntry {
                kind: ActivityKind::Event,
                tone: ActivityTone::Success,
                message: format!("{} held at {}", event.title, event.location),
                at: event.date,
            });
        }
    }

    entries.retain(|entry| entry.at <= now);
    entries.sort_by(|a, b| b.at.cmp(&a.at));
    entries.truncate(limit);
    entries
}

/// Landing-page figures for the active society.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub society_id: SocietyId,
    pub society_name: String,
    pub total_units: u32,
    pub registered_units: usize,
    pub active_residents: usize,
    pub monthly_collection: u64,
    pub collection_rate: Option<f64>,
    pub pending_complaints: usize,
    pub visitors_on_premises: usize,
    pub upcoming_events: usize,
    pub recent_activity: Vec<ActivityEntry>,
}

impl DashboardSummary {
    pub fn build(
        society: &Society,
        snapshot: &TenantSnapshot<'_>,
        now: DateTime<Utc>,
        activity_limit: usize,
    ) -> Self {
        let today = now.date_naive();

        Self {
            society_id: society.id.clone(),
            society_name: society.name.clone(),
            total_units: society.total_units,
            registered_units: snapshot.units.len(),
            active_residents: snapshot.units.iter().map(|unit| unit.residents.len()).sum(),
            monthly_collection: collected_in_month(snapshot.bills, today),
            collection_rate: collection_rate(snapshot.bills, today),
            pending_complaints: pending_count(snapshot.complaints),
            visitors_on_premises: visitors_with_status(
                snapshot.visitors,
                VisitorStatus::CheckedIn,
            ),
            upcoming_events: events_with_status(snapshot.events, EventStatus::Upcoming),
            recent_activity: recent_activity(snapshot, now, activity_limit),
        }
    }
}
