use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;

use crate::domain::{
    BillId, BillUpdate, ComplaintId, ComplaintUpdate, EventId, EventStatus, NewBill, NewComplaint,
    NewEvent, NewVisitor, SocietyId, SocietyUpdate, VisitorId,
};
use crate::filters::{BillQuery, ComplaintQuery, EventQuery, VisitorQuery};
use crate::repository::RepositoryError;
use crate::service::{ServiceError, SocietyService};
use crate::tenancy::{ContextError, TenantContext};

/// Shared handles for the society routes.
#[derive(Clone)]
pub struct HubState {
    pub service: Arc<SocietyService>,
    pub context: Arc<RwLock<TenantContext>>,
    clock: fn() -> DateTime<Utc>,
}

impl HubState {
    pub fn new(service: Arc<SocietyService>, context: Arc<RwLock<TenantContext>>) -> Self {
        Self {
            service,
            context,
            clock: Utc::now,
        }
    }

    /// Replace the wall clock, mainly so overdue and "this month" figures are reproducible.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }
}

/// Router builder exposing the session and the tenant-scoped views.
pub fn society_router(state: HubState) -> Router {
    Router::new()
        .route("/api/v1/session", get(session_handler))
        .route(
            "/api/v1/session/society",
            post(switch_society_handler).patch(update_society_handler),
        )
        .route("/api/v1/dashboard", get(dashboard_handler))
        .route("/api/v1/units", get(units_handler))
        .route(
            "/api/v1/billing",
            get(billing_handler).post(create_bill_handler),
        )
        .route("/api/v1/billing/:bill_id", post(update_bill_handler))
        .route(
            "/api/v1/complaints",
            get(complaints_handler).post(file_complaint_handler),
        )
        .route(
            "/api/v1/complaints/:complaint_id",
            patch(update_complaint_handler),
        )
        .route(
            "/api/v1/visitors",
            get(visitors_handler).post(check_in_handler),
        )
        .route(
            "/api/v1/visitors/:visitor_id/check-out",
            post(check_out_handler),
        )
        .route(
            "/api/v1/events",
            get(events_handler).post(schedule_event_handler),
        )
        .route("/api/v1/events/:event_id", patch(event_status_handler))
        .route(
            "/api/v1/events/:event_id/attendees",
            post(register_attendee_handler),
        )
        .route(
            "/api/v1/events/:event_id/contributions",
            post(contribution_handler),
        )
        .with_state(state)
}

/// HTTP status for a service failure.
pub(crate) fn status_for(error: &ServiceError) -> StatusCode {
    match error {
        ServiceError::Context(ContextError::NotReady) => StatusCode::SERVICE_UNAVAILABLE,
        ServiceError::Context(ContextError::SocietyNotFound(_)) => StatusCode::NOT_FOUND,
        ServiceError::Context(ContextError::NoActiveSociety) => StatusCode::CONFLICT,
        ServiceError::Context(ContextError::InvalidUpdate(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Context(ContextError::Directory(err)) | ServiceError::Repository(err) => {
            match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict => StatusCode::CONFLICT,
                RepositoryError::Unavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
        ServiceError::Lifecycle(_) | ServiceError::Validation(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn error_response(error: impl Into<ServiceError>) -> Response {
    let error = error.into();
    let payload = json!({
        "error": error.to_string(),
    });
    (status_for(&error), Json(payload)).into_response()
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, ServiceError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct SwitchSocietyRequest {
    pub society_id: SocietyId,
}

#[derive(Debug, Deserialize)]
pub struct CheckOutRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EventStatusRequest {
    pub status: EventStatus,
}

#[derive(Debug, Deserialize)]
pub struct AttendeeRequest {
    pub attendee: String,
}

#[derive(Debug, Deserialize)]
pub struct ContributionRequest {
    pub amount: u64,
}

async fn session_handler(State(state): State<HubState>) -> Response {
    let context = state.context.read().await;
    (StatusCode::OK, Json(context.view())).into_response()
}

async fn switch_society_handler(
    State(state): State<HubState>,
    Json(request): Json<SwitchSocietyRequest>,
) -> Response {
    let mut context = state.context.write().await;
    match context.switch_society(&request.society_id) {
        Ok(society) => (StatusCode::OK, Json(society)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn update_society_handler(
    State(state): State<HubState>,
    Json(update): Json<SocietyUpdate>,
) -> Response {
    let mut context = state.context.write().await;
    match context.update_society(update) {
        Ok(society) => (StatusCode::OK, Json(society)).into_response(),
        Err(err) => error_response(err),
    }
}

async fn dashboard_handler(State(state): State<HubState>) -> Response {
    let context = state.context.read().await;
    respond(StatusCode::OK, state.service.dashboard(&context, state.now()))
}

async fn units_handler(State(state): State<HubState>) -> Response {
    let context = state.context.read().await;
    respond(StatusCode::OK, state.service.units(&context))
}

async fn billing_handler(
    State(state): State<HubState>,
    Query(query): Query<BillQuery>,
) -> Response {
    let context = state.context.read().await;
    let today = state.now().date_naive();
    respond(StatusCode::OK, state.service.billing(&context, &query, today))
}

async fn create_bill_handler(
    State(state): State<HubState>,
    Json(new_bill): Json<NewBill>,
) -> Response {
    let context = state.context.read().await;
    respond(
        StatusCode::CREATED,
        state.service.create_bill(&context, new_bill, state.now()),
    )
}

async fn update_bill_handler(
    State(state): State<HubState>,
    Path(bill_id): Path<String>,
    Json(update): Json<BillUpdate>,
) -> Response {
    let context = state.context.read().await;
    let today = state.now().date_naive();
    respond(
        StatusCode::OK,
        state
            .service
            .update_bill(&context, &BillId(bill_id), update, today),
    )
}

async fn complaints_handler(
    State(state): State<HubState>,
    Query(query): Query<ComplaintQuery>,
) -> Response {
    let context = state.context.read().await;
    respond(StatusCode::OK, state.service.complaints(&context, &query))
}

async fn file_complaint_handler(
    State(state): State<HubState>,
    Json(new_complaint): Json<NewComplaint>,
) -> Response {
    let context = state.context.read().await;
    respond(
        StatusCode::CREATED,
        state
            .service
            .file_complaint(&context, new_complaint, state.now()),
    )
}

async fn update_complaint_handler(
    State(state): State<HubState>,
    Path(complaint_id): Path<String>,
    Json(update): Json<ComplaintUpdate>,
) -> Response {
    let context = state.context.read().await;
    respond(
        StatusCode::OK,
        state
            .service
            .update_complaint(&context, &ComplaintId(complaint_id), update),
    )
}

async fn visitors_handler(
    State(state): State<HubState>,
    Query(query): Query<VisitorQuery>,
) -> Response {
    let context = state.context.read().await;
    respond(StatusCode::OK, state.service.visitors(&context, &query))
}

async fn check_in_handler(
    State(state): State<HubState>,
    Json(new_visitor): Json<NewVisitor>,
) -> Response {
    let context = state.context.read().await;
    respond(
        StatusCode::CREATED,
        state
            .service
            .check_in_visitor(&context, new_visitor, state.now()),
    )
}

async fn check_out_handler(
    State(state): State<HubState>,
    Path(visitor_id): Path<String>,
    Json(request): Json<CheckOutRequest>,
) -> Response {
    let context = state.context.read().await;
    respond(
        StatusCode::OK,
        state.service.check_out_visitor(
            &context,
            &VisitorId(visitor_id),
            state.now(),
            request.notes,
        ),
    )
}

async fn events_handler(
    State(state): State<HubState>,
    Query(query): Query<EventQuery>,
) -> Response {
    let context = state.context.read().await;
    respond(StatusCode::OK, state.service.events(&context, &query))
}

async fn schedule_event_handler(
    State(state): State<HubState>,
    Json(new_event): Json<NewEvent>,
) -> Response {
    let context = state.context.read().await;
    respond(
        StatusCode::CREATED,
        state.service.schedule_event(&context, new_event),
    )
}

async fn event_status_handler(
    State(state): State<HubState>,
    Path(event_id): Path<String>,
    Json(request): Json<EventStatusRequest>,
) -> Response {
    let context = state.context.read().await;
    respond(
        StatusCode::OK,
        state
            .service
            .update_event_status(&context, &EventId(event_id), request.status),
    )
}

async fn register_attendee_handler(
    State(state): State<HubState>,
    Path(event_id): Path<String>,
    Json(request): Json<AttendeeRequest>,
) -> Response {
    let context = state.context.read().await;
    respond(
        StatusCode::OK,
        state
            .service
            .register_attendee(&context, &EventId(event_id), &request.attendee),
    )
}

async fn contribution_handler(
    State(state): State<HubState>,
    Path(event_id): Path<String>,
    Json(request): Json<ContributionRequest>,
) -> Response {
    let context = state.context.read().await;
    respond(
        StatusCode::OK,
        state
            .service
            .record_contribution(&context, &EventId(event_id), request.amount),
    )
}
