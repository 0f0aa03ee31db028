//! Entity definitions for the society dashboard and their field-level invariants.
//!
//! Every entity other than [`Society`] carries a [`SocietyId`], the tenant partition key.

pub mod billing;
pub mod complaint;
pub mod event;
pub mod society;
pub mod unit;
pub mod user;
pub mod visitor;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use billing::{BillStatus, BillUpdate, MaintenanceBill, NewBill};
pub use complaint::{
    Complaint, ComplaintCategory, ComplaintPriority, ComplaintStatus, ComplaintUpdate,
    NewComplaint,
};
pub use event::{Event, EventCategory, EventStatus, NewEvent};
pub use society::{Society, SocietyPlan, SocietyUpdate};
pub use unit::{Unit, UnitKind};
pub use user::{Principal, User, UserRole};
pub use visitor::{NewVisitor, Visitor, VisitorStatus};

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

identifier!(
    /// Tenant partition key.
    SocietyId
);
identifier!(UserId);
identifier!(UnitId);
identifier!(BillId);
identifier!(ComplaintId);
identifier!(VisitorId);
identifier!(EventId);

/// Field-level invariant violations raised before a record is accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
    #[error("amount must be greater than zero")]
    NonPositiveAmount,
    #[error("amount {amount} would push the society's billed total past the maximum")]
    AmountOverflow { amount: u64 },
    #[error("{field} must be a #RRGGBB colour, got '{value}'")]
    InvalidColor { field: &'static str, value: String },
    #[error("unit {0} does not belong to the active society")]
    UnknownUnit(UnitId),
    #[error("{0}")]
    Inconsistent(String),
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::EmptyField { field })
    } else {
        Ok(())
    }
}
