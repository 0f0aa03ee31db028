//! Pure, stateless derivations over entity collections. Nothing here caches; every
//! read recomputes from the slice it is handed.

pub mod billing;
pub mod complaints;
pub mod dashboard;
pub mod events;
pub mod visitors;

pub use billing::{checked_total_with, BillingSummary};
pub use complaints::{CategoryCount, ComplaintSummary};
pub use dashboard::{
    recent_activity, ActivityEntry, ActivityKind, ActivityTone, DashboardSummary,
    TenantSnapshot,
};
pub use events::{attendance_ratio, contribution_progress, EventSummary};
pub use visitors::VisitorSummary;
