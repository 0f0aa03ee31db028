use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_text, ComplaintId, SocietyId, UnitId, UserId, ValidationError};
use crate::lifecycle::{invalid_transition, Lifecycle, LifecycleError, TransitionFault};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintCategory {
    Maintenance,
    Security,
    Cleanliness,
    Noise,
    Other,
}

impl ComplaintCategory {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Maintenance,
            Self::Security,
            Self::Cleanliness,
            Self::Noise,
            Self::Other,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Maintenance => "Maintenance",
            Self::Security => "Security",
            Self::Cleanliness => "Cleanliness",
            Self::Noise => "Noise",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl ComplaintPriority {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Open,
    #[serde(alias = "in-progress")]
    InProgress,
    Resolved,
    Closed,
}

impl ComplaintStatus {
    pub const fn ordered() -> [Self; 4] {
        [Self::Open, Self::InProgress, Self::Resolved, Self::Closed]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Closed => "Closed",
        }
    }

    /// Resolved and closed complaints must carry a resolution timestamp.
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

impl Lifecycle for ComplaintStatus {
    const ENTITY: &'static str = "complaint";

    fn state_name(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
        }
    }

    fn successors(self) -> &'static [Self] {
        match self {
            Self::Open => &[Self::InProgress, Self::Closed],
            Self::InProgress => &[Self::Resolved],
            Self::Resolved => &[Self::Closed],
            Self::Closed => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: ComplaintId,
    pub society_id: SocietyId,
    pub unit_id: UnitId,
    pub resident_id: UserId,
    pub category: ComplaintCategory,
    pub title: String,
    pub description: String,
    pub status: ComplaintStatus,
    pub priority: ComplaintPriority,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_response: Option<String>,
}

impl Complaint {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("title", &self.title)?;
        require_text("description", &self.description)?;

        match (self.status.is_settled(), self.resolved_at) {
            (true, None) => Err(ValidationError::Inconsistent(format!(
                "complaint {} is {} without resolved_at",
                self.id,
                self.status.state_name()
            ))),
            (false, Some(_)) => Err(ValidationError::Inconsistent(format!(
                "complaint {} has resolved_at but is {}",
                self.id,
                self.status.state_name()
            ))),
            (true, Some(resolved_at)) if resolved_at < self.created_at => {
                Err(ValidationError::Inconsistent(format!(
                    "complaint {} resolved before it was filed",
                    self.id
                )))
            }
            _ => Ok(()),
        }
    }

    pub fn apply(&mut self, update: ComplaintUpdate) -> Result<(), LifecycleError> {
        let current = self.status;
        let target = update.status;
        current.check_transition(target)?;

        let resolved_at = if target.is_settled() {
            // The first resolution time sticks through later settled writes.
            let resolved_at = self
                .resolved_at
                .or(update.resolved_at)
                .ok_or_else(|| {
                    invalid_transition(
                        current,
                        target,
                        TransitionFault::MissingTimestamp("resolved_at"),
                    )
                })?;
            if resolved_at < self.created_at {
                return Err(invalid_transition(
                    current,
                    target,
                    TransitionFault::TimestampOrder("resolved_at"),
                ));
            }
            Some(resolved_at)
        } else {
            if update.resolved_at.is_some() {
                return Err(invalid_transition(
                    current,
                    target,
                    TransitionFault::NotPermitted,
                ));
            }
            None
        };

        self.status = target;
        self.resolved_at = resolved_at;
        if let Some(response) = update.manager_response {
            self.manager_response = Some(response);
        }
        Ok(())
    }
}

/// Status write from the management desk, optionally with a response to the resident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintUpdate {
    pub status: ComplaintStatus,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub manager_response: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComplaint {
    pub unit_id: UnitId,
    pub resident_id: UserId,
    pub category: ComplaintCategory,
    pub title: String,
    pub description: String,
    pub priority: ComplaintPriority,
}

impl NewComplaint {
    pub fn into_complaint(
        self,
        id: ComplaintId,
        society_id: SocietyId,
        created_at: DateTime<Utc>,
    ) -> Complaint {
        Complaint {
            id,
            society_id,
            unit_id: self.unit_id,
            resident_id: self.resident_id,
            category: self.category,
            title: self.title,
            description: self.description,
            status: ComplaintStatus::Open,
            priority: self.priority,
            created_at,
            resolved_at: None,
            manager_response: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn complaint() -> Complaint {
        NewComplaint {
            unit_id: UnitId::new("B-203"),
            resident_id: UserId::new("alice"),
            category: ComplaintCategory::Maintenance,
            title: "Water leakage in bathroom".to_string(),
            description: "Continuous leakage from the ceiling".to_string(),
            priority: ComplaintPriority::High,
        }
        .into_complaint(
            ComplaintId::new("complaint-1"),
            SocietyId::new("1"),
            Utc.with_ymd_and_hms(2024, 11, 10, 10, 30, 0).unwrap(),
        )
    }

    #[test]
    fn resolving_without_timestamp_is_rejected() {
        let mut complaint = complaint();
        complaint
            .apply(ComplaintUpdate {
                status: ComplaintStatus::InProgress,
                resolved_at: None,
                manager_response: Some("Plumber contacted".to_string()),
            })
            .expect("open -> in_progress");

        let err = complaint
            .apply(ComplaintUpdate {
                status: ComplaintStatus::Resolved,
                resolved_at: None,
                manager_response: None,
            })
            .expect_err("resolved_at is required");

        assert!(matches!(
            err,
            LifecycleError::InvalidTransition {
                entity: "complaint",
                fault: TransitionFault::MissingTimestamp("resolved_at"),
                ..
            }
        ));
        assert_eq!(complaint.status, ComplaintStatus::InProgress);
        assert!(complaint.validate().is_ok());
    }

    #[test]
    fn closing_a_resolved_complaint_keeps_resolution_time() {
        let mut complaint = complaint();
        let resolved_at = complaint.created_at + Duration::hours(30);
        complaint
            .apply(ComplaintUpdate {
                status: ComplaintStatus::InProgress,
                resolved_at: None,
                manager_response: None,
            })
            .expect("start work");
        complaint
            .apply(ComplaintUpdate {
                status: ComplaintStatus::Resolved,
                resolved_at: Some(resolved_at),
                manager_response: Some("Fixed".to_string()),
            })
            .expect("resolve");
        complaint
            .apply(ComplaintUpdate {
                status: ComplaintStatus::Closed,
                resolved_at: None,
                manager_response: None,
            })
            .expect("close");

        assert_eq!(complaint.status, ComplaintStatus::Closed);
        assert_eq!(complaint.resolved_at, Some(resolved_at));
        assert_eq!(complaint.manager_response.as_deref(), Some("Fixed"));
    }

    #[test]
    fn later_settled_writes_do_not_move_resolution_time() {
        let mut complaint = complaint();
        let resolved_at = complaint.created_at + Duration::hours(30);
        complaint
            .apply(ComplaintUpdate {
                status: ComplaintStatus::InProgress,
                resolved_at: None,
                manager_response: None,
            })
            .expect("start work");
        complaint
            .apply(ComplaintUpdate {
                status: ComplaintStatus::Resolved,
                resolved_at: Some(resolved_at),
                manager_response: None,
            })
            .expect("resolve");
        complaint
            .apply(ComplaintUpdate {
                status: ComplaintStatus::Closed,
                resolved_at: Some(resolved_at + Duration::days(3)),
                manager_response: None,
            })
            .expect("close");

        assert_eq!(complaint.status, ComplaintStatus::Closed);
        assert_eq!(complaint.resolved_at, Some(resolved_at));
    }

    #[test]
    fn resolution_cannot_precede_filing() {
        let mut complaint = complaint();
        let err = complaint
            .apply(ComplaintUpdate {
                status: ComplaintStatus::Closed,
                resolved_at: Some(complaint.created_at - Duration::minutes(5)),
                manager_response: None,
            })
            .expect_err("timestamps out of order");
        assert!(matches!(
            err,
            LifecycleError::InvalidTransition {
                fault: TransitionFault::TimestampOrder("resolved_at"),
                ..
            }
        ));
    }

    #[test]
    fn hyphenated_status_is_accepted() {
        let status: ComplaintStatus =
            serde_json::from_str("\"in-progress\"").expect("alias parses");
        assert_eq!(status, ComplaintStatus::InProgress);
    }
}
