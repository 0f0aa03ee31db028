use serde::Serialize;

use super::billing::{ratio, saturating_sum};
use crate::domain::{Event, EventStatus};

pub fn count_with_status(events: &[Event], status: EventStatus) -> usize {
    events.iter().filter(|event| event.status == status).count()
}

/// `contributions_paid / (contribution_required × total_contributors)`.
///
/// `None` when the event asks for no contribution or nobody has contributed yet.
pub fn contribution_progress(event: &Event) -> Option<f64> {
    let required = event.contribution_required.unwrap_or(0);
    let expected = required.checked_mul(u64::from(event.total_contributors))?;
    ratio(event.contributions_paid, expected)
}

/// Registered attendees over capacity. `None` for unbounded or zero-capacity events.
pub fn attendance_ratio(event: &Event) -> Option<f64> {
    let capacity = event.max_attendees?;
    ratio(event.attendees.len() as u64, u64::from(capacity))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EventSummary {
    pub total: usize,
    pub upcoming: usize,
    pub ongoing: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub total_attendees: usize,
    pub total_contributions: u64,
}

impl EventSummary {
    pub fn from_events(events: &[Event]) -> Self {
        Self {
            total: events.len(),
            upcoming: count_with_status(events, EventStatus::Upcoming),
            ongoing: count_with_status(events, EventStatus::Ongoing),
            completed: count_with_status(events, EventStatus::Completed),
            cancelled: count_with_status(events, EventStatus::Cancelled),
            total_attendees: events.iter().map(|event| event.attendees.len()).sum(),
            total_contributions: saturating_sum(
                events.iter().map(|event| event.contributions_paid),
            ),
        }
    }
}
