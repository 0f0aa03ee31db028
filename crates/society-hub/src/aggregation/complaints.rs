use serde::Serialize;

use crate::domain::{Complaint, ComplaintCategory, ComplaintPriority, ComplaintStatus};

pub fn count_with_status(complaints: &[Complaint], status: ComplaintStatus) -> usize {
    complaints
        .iter()
        .filter(|complaint| complaint.status == status)
        .count()
}

/// Complaints still awaiting resolution (open or in progress).
pub fn pending_count(complaints: &[Complaint]) -> usize {
    complaints
        .iter()
        .filter(|complaint| !complaint.status.is_settled())
        .count()
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCount {
    pub category: ComplaintCategory,
    pub category_label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ComplaintSummary {
    pub total: usize,
    pub open: usize,
    pub in_progress: usize,
    pub resolved: usize,
    pub closed: usize,
    pub urgent_open: usize,
    pub by_category: Vec<CategoryCount>,
}

impl ComplaintSummary {
    pub fn from_complaints(complaints: &[Complaint]) -> Self {
        let by_category = ComplaintCategory::ordered()
            .into_iter()
            .map(|category| CategoryCount {
                category,
                category_label: category.label(),
                count: complaints
                    .iter()
                    .filter(|complaint| complaint.category == category)
                    .count(),
            })
            .filter(|entry| entry.count > 0)
            .collect();

        Self {
            total: complaints.len(),
            open: count_with_status(complaints, ComplaintStatus::Open),
            in_progress: count_with_status(complaints, ComplaintStatus::InProgress),
            resolved: count_with_status(complaints, ComplaintStatus::Resolved),
            closed: count_with_status(complaints, ComplaintStatus::Closed),
            urgent_open: complaints
                .iter()
                .filter(|complaint| {
                    complaint.priority == ComplaintPriority::Urgent
                        && !complaint.status.is_settled()
                })
                .count(),
            by_category,
        }
    }
}
