use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{require_text, BillId, SocietyId, UnitId, ValidationError};
use crate::lifecycle::{invalid_transition, Lifecycle, LifecycleError, TransitionFault};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Paid,
    Pending,
    Overdue,
}

impl BillStatus {
    pub const fn ordered() -> [Self; 3] {
        [Self::Paid, Self::Pending, Self::Overdue]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Paid => "Paid",
            Self::Pending => "Pending",
            Self::Overdue => "Overdue",
        }
    }
}

impl Lifecycle for BillStatus {
    const ENTITY: &'static str = "bill";

    fn state_name(self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::Pending => "pending",
            Self::Overdue => "overdue",
        }
    }

    fn successors(self) -> &'static [Self] {
        match self {
            Self::Pending => &[Self::Paid, Self::Overdue],
            Self::Overdue => &[Self::Paid],
            Self::Paid => &[],
        }
    }
}

/// Monthly maintenance charge raised against a unit.
///
/// The stored `status` is only authoritative once the bill is paid. Pending and
/// overdue are recomputed from `due_date` on every read, see
/// [`MaintenanceBill::effective_status`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceBill {
    pub id: BillId,
    pub society_id: SocietyId,
    pub unit_id: UnitId,
    pub amount: u64,
    pub due_date: NaiveDate,
    pub status: BillStatus,
    pub description: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_on: Option<NaiveDate>,
}

impl MaintenanceBill {
    pub fn effective_status(&self, today: NaiveDate) -> BillStatus {
        match self.status {
            BillStatus::Paid => BillStatus::Paid,
            BillStatus::Pending | BillStatus::Overdue if today > self.due_date => {
                BillStatus::Overdue
            }
            BillStatus::Pending | BillStatus::Overdue => BillStatus::Pending,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.amount == 0 {
            return Err(ValidationError::NonPositiveAmount);
        }
        require_text("description", &self.description)?;

        match (self.status, self.paid_on) {
            (BillStatus::Paid, None) => Err(ValidationError::Inconsistent(format!(
                "bill {} is paid without a paid_on date",
                self.id
            ))),
            (BillStatus::Pending | BillStatus::Overdue, Some(_)) => {
                Err(ValidationError::Inconsistent(format!(
                    "bill {} has a paid_on date but is not paid",
                    self.id
                )))
            }
            _ => Ok(()),
        }
    }

    /// Apply a status write. Overdue can only be asserted once the due date has passed.
    pub fn apply(&mut self, update: BillUpdate, today: NaiveDate) -> Result<(), LifecycleError> {
        let current = self.effective_status(today);
        current.check_transition(update.status)?;

        match update.status {
            BillStatus::Paid => {
                let paid_on = update.paid_on.ok_or_else(|| {
                    invalid_transition(
                        current,
                        BillStatus::Paid,
                        TransitionFault::MissingTimestamp("paid_on"),
                    )
                })?;
                if paid_on < self.created_at.date_naive() {
                    return Err(invalid_transition(
                        current,
                        BillStatus::Paid,
                        TransitionFault::TimestampOrder("paid_on"),
                    ));
                }
                if current == BillStatus::Paid && self.paid_on.is_some() {
                    return Ok(());
                }
                self.paid_on = Some(paid_on);
            }
            BillStatus::Overdue if today <= self.due_date => {
                return Err(invalid_transition(
                    current,
                    BillStatus::Overdue,
                    TransitionFault::NotPermitted,
                ));
            }
            BillStatus::Overdue | BillStatus::Pending => {}
        }

        self.status = update.status;
        Ok(())
    }
}

/// Status write submitted by the billing desk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillUpdate {
    pub status: BillStatus,
    #[serde(default)]
    pub paid_on: Option<NaiveDate>,
}

impl BillUpdate {
    pub fn paid(paid_on: NaiveDate) -> Self {
        Self {
            status: BillStatus::Paid,
            paid_on: Some(paid_on),
        }
    }
}

/// Fields supplied when raising a bill; ids and timestamps are assigned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBill {
    pub unit_id: UnitId,
    pub amount: u64,
    pub due_date: NaiveDate,
    pub description: String,
}

impl NewBill {
    pub fn into_bill(
        self,
        id: BillId,
        society_id: SocietyId,
        created_at: DateTime<Utc>,
    ) -> MaintenanceBill {
        MaintenanceBill {
            id,
            society_id,
            unit_id: self.unit_id,
            amount: self.amount,
            due_date: self.due_date,
            status: BillStatus::Pending,
            description: self.description,
            created_at,
            paid_on: None,
        }
    }
}
