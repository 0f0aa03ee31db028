use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_text, EventId, SocietyId, ValidationError};
use crate::lifecycle::{Lifecycle, LifecycleError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Festival,
    Meeting,
    Health,
    Celebration,
    Sports,
}

impl EventCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Festival => "Festival",
            Self::Meeting => "Meeting",
            Self::Health => "Health",
            Self::Celebration => "Celebration",
            Self::Sports => "Sports",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Upcoming,
            Self::Ongoing,
            Self::Completed,
            Self::Cancelled,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::Ongoing => "Ongoing",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl Lifecycle for EventStatus {
    const ENTITY: &'static str = "event";

    fn state_name(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    fn successors(self) -> &'static [Self] {
        match self {
            Self::Upcoming => &[Self::Ongoing, Self::Cancelled],
            Self::Ongoing => &[Self::Completed],
            Self::Completed | Self::Cancelled => &[],
        }
    }
}

/// Community event with optional per-head contribution and attendee cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub society_id: SocietyId,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub organizer: String,
    pub category: EventCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution_required: Option<u64>,
    #[serde(default)]
    pub contributions_paid: u64,
    #[serde(default)]
    pub total_contributors: u32,
    #[serde(default)]
    pub attendees: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attendees: Option<u32>,
    pub status: EventStatus,
}

impl Event {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("location", &self.location)?;
        require_text("organizer", &self.organizer)?;
        match self.max_attendees {
            Some(capacity) if self.attendees.len() > capacity as usize => {
                Err(ValidationError::Inconsistent(format!(
                    "event {} has {} attendees but a capacity of {}",
                    self.id,
                    self.attendees.len(),
                    capacity
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn is_full(&self) -> bool {
        self.max_attendees
            .is_some_and(|capacity| self.attendees.len() >= capacity as usize)
    }

    pub fn transition(&mut self, next: EventStatus) -> Result<(), LifecycleError> {
        self.status.check_transition(next)?;
        self.status = next;
        Ok(())
    }

    /// Returns `false` when the attendee was already registered.
    pub fn register_attendee(&mut self, attendee: &str) -> Result<bool, LifecycleError> {
        if self.status.is_terminal() {
            return Err(LifecycleError::EventClosed {
                status: self.status.state_name(),
                action: "attendees",
            });
        }
        if self.attendees.iter().any(|existing| existing == attendee) {
            return Ok(false);
        }
        if let Some(capacity) = self.max_attendees.filter(|_| self.is_full()) {
            return Err(LifecycleError::EventFull { capacity });
        }

        self.attendees.push(attendee.to_string());
        Ok(true)
    }

    pub fn record_contribution(&mut self, amount: u64) -> Result<(), LifecycleError> {
        if self.status == EventStatus::Cancelled {
            return Err(LifecycleError::EventClosed {
                status: self.status.state_name(),
                action: "contributions",
            });
        }

        let paid = self
            .contributions_paid
            .checked_add(amount)
            .ok_or(LifecycleError::TallyOverflow {
                field: "contributions_paid",
            })?;
        let contributors = self
            .total_contributors
            .checked_add(1)
            .ok_or(LifecycleError::TallyOverflow {
                field: "total_contributors",
            })?;

        self.contributions_paid = paid;
        self.total_contributors = contributors;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub organizer: String,
    pub category: EventCategory,
    #[serde(default)]
    pub contribution_required: Option<u64>,
    #[serde(default)]
    pub max_attendees: Option<u32>,
}

impl NewEvent {
    pub fn into_event(self, id: EventId, society_id: SocietyId) -> Event {
        Event {
            id,
            society_id,
            title: self.title,
            description: self.description,
            date: self.date,
            location: self.location,
            organizer: self.organizer,
            category: self.category,
            contribution_required: self.contribution_required.filter(|amount| *amount > 0),
            contributions_paid: 0,
            total_contributors: 0,
            attendees: Vec::new(),
            max_attendees: self.max_attendees,
            status: EventStatus::Upcoming,
        }
    }
}
