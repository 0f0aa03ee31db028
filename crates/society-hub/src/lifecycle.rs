//! State machines governing bill, complaint, visitor and event status fields.
//!
//! All transitions are single-writer: one actor moves a record at a time and the
//! persistence collaborator arbitrates concurrent writes. The rules here only decide
//! whether a transition may be accepted.

use std::fmt;

/// A status enum with a fixed set of permitted successor states.
pub trait Lifecycle: Copy + PartialEq + fmt::Debug + 'static {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    fn state_name(self) -> &'static str;

    /// States reachable in one step. Empty for terminal states.
    fn successors(self) -> &'static [Self];

    fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    /// Re-asserting the current state is always allowed.
    fn can_transition_to(self, next: Self) -> bool {
        self == next || self.successors().contains(&next)
    }

    fn check_transition(self, next: Self) -> Result<(), LifecycleError> {
        if self.can_transition_to(next) {
            return Ok(());
        }

        let fault = if self.is_terminal() {
            TransitionFault::Terminal
        } else {
            TransitionFault::NotPermitted
        };
        Err(invalid_transition(self, next, fault))
    }
}

pub(crate) fn invalid_transition<S: Lifecycle>(
    from: S,
    to: S,
    fault: TransitionFault,
) -> LifecycleError {
    LifecycleError::InvalidTransition {
        entity: S::ENTITY,
        from: from.state_name(),
        to: to.state_name(),
        fault,
    }
}

/// Why a transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionFault {
    NotPermitted,
    Terminal,
    MissingTimestamp(&'static str),
    TimestampOrder(&'static str),
}

impl fmt::Display for TransitionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionFault::NotPermitted => write!(f, "transition not permitted"),
            TransitionFault::Terminal => write!(f, "current status is terminal"),
            TransitionFault::MissingTimestamp(field) => write!(f, "{field} must be set"),
            TransitionFault::TimestampOrder(field) => {
                write!(f, "{field} precedes the previous timestamp")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("invalid {entity} transition from {from} to {to}: {fault}")]
    InvalidTransition {
        entity: &'static str,
        from: &'static str,
        to: &'static str,
        fault: TransitionFault,
    },
    #[error("event is full ({capacity} attendees)")]
    EventFull { capacity: u32 },
    #[error("event is {status} and no longer accepts {action}")]
    EventClosed {
        status: &'static str,
        action: &'static str,
    },
    #[error("event {field} would exceed its maximum")]
    TallyOverflow { field: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BillStatus, ComplaintStatus, EventStatus, VisitorStatus};

    #[test]
    fn bill_paths_follow_pending_overdue_paid() {
        assert!(BillStatus::Pending.can_transition_to(BillStatus::Paid));
        assert!(BillStatus::Pending.can_transition_to(BillStatus::Overdue));
        assert!(BillStatus::Overdue.can_transition_to(BillStatus::Paid));
        assert!(!BillStatus::Overdue.can_transition_to(BillStatus::Pending));
        assert!(BillStatus::Paid.is_terminal());
    }

    #[test]
    fn complaint_can_close_directly_from_open_only() {
        assert!(ComplaintStatus::Open.can_transition_to(ComplaintStatus::Closed));
        assert!(!ComplaintStatus::InProgress.can_transition_to(ComplaintStatus::Closed));
        assert!(!ComplaintStatus::Open.can_transition_to(ComplaintStatus::Resolved));
        assert!(ComplaintStatus::Resolved.can_transition_to(ComplaintStatus::Closed));
    }

    #[test]
    fn terminal_states_report_terminal_fault() {
        let err = EventStatus::Cancelled
            .check_transition(EventStatus::Ongoing)
            .expect_err("cancelled is terminal");
        assert_eq!(
            err,
            LifecycleError::InvalidTransition {
                entity: "event",
                from: "cancelled",
                to: "ongoing",
                fault: TransitionFault::Terminal,
            }
        );

        assert!(VisitorStatus::CheckedOut.is_terminal());
        assert!(VisitorStatus::CheckedIn
            .check_transition(VisitorStatus::CheckedOut)
            .is_ok());
    }

    #[test]
    fn self_transition_is_accepted() {
        assert!(ComplaintStatus::Closed
            .check_transition(ComplaintStatus::Closed)
            .is_ok());
    }
}
