//! Multi-tenant residential society management: maintenance billing, complaints,
//! visitor logs and community events, each partitioned by society.

pub mod aggregation;
pub mod config;
pub mod domain;
pub mod error;
pub mod filters;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod service;
pub mod telemetry;
pub mod tenancy;

pub use router::{society_router, HubState};
pub use service::{Repositories, ServiceError, SocietyService};
pub use tenancy::TenantContext;

#[cfg(test)]
mod tests;
