use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{require_text, SocietyId, UnitId, ValidationError, VisitorId};
use crate::lifecycle::{invalid_transition, Lifecycle, LifecycleError, TransitionFault};

/// Derived from `check_out_time`; never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisitorStatus {
    #[serde(alias = "checked-in")]
    CheckedIn,
    #[serde(alias = "checked-out")]
    CheckedOut,
}

impl VisitorStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::CheckedIn => "Checked In",
            Self::CheckedOut => "Checked Out",
        }
    }
}

impl Lifecycle for VisitorStatus {
    const ENTITY: &'static str = "visitor";

    fn state_name(self) -> &'static str {
        match self {
            Self::CheckedIn => "checked_in",
            Self::CheckedOut => "checked_out",
        }
    }

    fn successors(self) -> &'static [Self] {
        match self {
            Self::CheckedIn => &[Self::CheckedOut],
            Self::CheckedOut => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visitor {
    pub id: VisitorId,
    pub society_id: SocietyId,
    pub unit_id: UnitId,
    pub name: String,
    pub phone: String,
    pub purpose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_number: Option<String>,
    pub check_in_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<DateTime<Utc>>,
    pub approved_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_notes: Option<String>,
}

impl Visitor {
    pub fn status(&self) -> VisitorStatus {
        match self.check_out_time {
            Some(_) => VisitorStatus::CheckedOut,
            None => VisitorStatus::CheckedIn,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_text("name", &self.name)?;
        require_text("approved_by", &self.approved_by)?;
        match self.check_out_time {
            Some(check_out) if check_out < self.check_in_time => {
                Err(ValidationError::Inconsistent(format!(
                    "visitor {} checked out before checking in",
                    self.id
                )))
            }
            _ => Ok(()),
        }
    }

    /// Record departure. Notes are appended to any left at the gate on arrival.
    ///
    /// Repeating a check-out without notes is a no-op and keeps the first departure time.
    pub fn check_out(
        &mut self,
        at: DateTime<Utc>,
        notes: Option<String>,
    ) -> Result<(), LifecycleError> {
        let notes = notes.filter(|notes| !notes.trim().is_empty());
        let current = self.status();
        if current.is_terminal() {
            if notes.is_none() {
                return Ok(());
            }
            return Err(invalid_transition(
                current,
                VisitorStatus::CheckedOut,
                TransitionFault::Terminal,
            ));
        }
        if at < self.check_in_time {
            return Err(invalid_transition(
                current,
                VisitorStatus::CheckedOut,
                TransitionFault::TimestampOrder("check_out_time"),
            ));
        }

        self.check_out_time = Some(at);
        if let Some(notes) = notes {
            self.security_notes = Some(match self.security_notes.take() {
                Some(existing) => format!("{existing}; {notes}"),
                None => notes,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVisitor {
    pub unit_id: UnitId,
    pub name: String,
    pub phone: String,
    pub purpose: String,
    #[serde(default)]
    pub vehicle_number: Option<String>,
    pub approved_by: String,
    #[serde(default)]
    pub security_notes: Option<String>,
}

impl NewVisitor {
    pub fn into_visitor(
        self,
        id: VisitorId,
        society_id: SocietyId,
        check_in_time: DateTime<Utc>,
    ) -> Visitor {
        Visitor {
            id,
            society_id,
            unit_id: self.unit_id,
            name: self.name,
            phone: self.phone,
            purpose: self.purpose,
            vehicle_number: self.vehicle_number.filter(|plate| !plate.trim().is_empty()),
            check_in_time,
            check_out_time: None,
            approved_by: self.approved_by,
            security_notes: self.security_notes,
        }
    }
}
