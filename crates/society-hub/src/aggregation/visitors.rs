use serde::Serialize;

use crate::domain::{Visitor, VisitorStatus};

pub fn count_with_status(visitors: &[Visitor], status: VisitorStatus) -> usize {
    visitors
        .iter()
        .filter(|visitor| visitor.status() == status)
        .count()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VisitorSummary {
    pub total: usize,
    pub checked_in: usize,
    pub checked_out: usize,
    pub with_vehicle: usize,
}

impl VisitorSummary {
    pub fn from_visitors(visitors: &[Visitor]) -> Self {
        Self {
            total: visitors.len(),
            checked_in: count_with_status(visitors, VisitorStatus::CheckedIn),
            checked_out: count_with_status(visitors, VisitorStatus::CheckedOut),
            with_vehicle: visitors
                .iter()
                .filter(|visitor| visitor.vehicle_number.is_some())
                .count(),
        }
    }
}
