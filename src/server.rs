//! HTTP front door: health probe and read-only listing endpoints

use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};
use uuid::Uuid;

use crate::{
    database::{CallContext, Database},
    errors::ShipmanError,
    models::{
        BillOfLading, CargoLoad, CharterDetail, DemurrageRecord, Dispute, LaytimeEntry, Payment,
        ShipPosition, User, Vessel, Voyage, VoyagePort,
    },
};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 500;

#[derive(Debug, Clone)]
pub struct AppState {
    db: Database,
    request_timeout: Duration,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(db: Database, request_timeout: Duration, shutdown: CancellationToken) -> Self {
        Self {
            db,
            request_timeout,
            shutdown,
        }
    }

    /// Context for one request: bounded by the configured timeout, cancelled on shutdown
    fn context(&self) -> CallContext {
        CallContext::with_timeout(self.request_timeout).with_cancellation(self.shutdown.child_token())
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/users", get(list_users))
        .route("/api/users/{id}", get(get_user))
        .route("/api/vessels", get(list_vessels))
        .route("/api/vessels/{id}", get(get_vessel))
        .route("/api/charters", get(list_charters))
        .route("/api/charters/{id}", get(get_charter))
        .route("/api/charters/{id}/voyages", get(list_charter_voyages))
        .route("/api/charters/{id}/laytime", get(list_charter_laytime))
        .route("/api/charters/{id}/payments", get(list_charter_payments))
        .route("/api/charters/{id}/disputes", get(list_charter_disputes))
        .route("/api/charters/{id}/bills-of-lading", get(list_charter_bills))
        .route("/api/charters/{id}/demurrage", get(list_charter_demurrage))
        .route("/api/voyages/{id}", get(get_voyage))
        .route("/api/voyages/{id}/ports", get(list_voyage_ports))
        .route("/api/voyages/{id}/positions", get(list_voyage_positions))
        .route("/api/voyages/{id}/cargo", get(list_voyage_cargo))
        .route("/api/voyages/{id}/laytime", get(list_voyage_laytime))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    limit: Option<i64>,
    offset: Option<i64>,
}

impl Pagination {
    /// `(limit, offset)` with the limit clamped to `1..=500`
    fn bounds(&self) -> (i64, i64) {
        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TrackQuery {
    limit: Option<i64>,
}

impl IntoResponse for ShipmanError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound { .. } | Self::NotFoundByKey { .. } => StatusCode::NOT_FOUND,
            Self::ConstraintViolation(_) => StatusCode::CONFLICT,
            Self::ResourceExhausted(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Cancelled | Self::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match state.db.ping(&state.context()).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "unhealthy", "error": e.to_string() })),
            )
        }
    }
}

async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<User>>, ShipmanError> {
    let (limit, offset) = page.bounds();
    let users = state.db.users().list(&state.context(), limit, offset).await?;
    Ok(Json(users))
}

async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, ShipmanError> {
    Ok(Json(state.db.users().retrieve(&state.context(), id).await?))
}

async fn list_vessels(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Vessel>>, ShipmanError> {
    let (limit, offset) = page.bounds();
    let vessels = state.db.vessels().list(&state.context(), limit, offset).await?;
    Ok(Json(vessels))
}

async fn get_vessel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vessel>, ShipmanError> {
    Ok(Json(state.db.vessels().retrieve(&state.context(), id).await?))
}

async fn list_charters(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<CharterDetail>>, ShipmanError> {
    let (limit, offset) = page.bounds();
    let charters = state
        .db
        .charter_details()
        .list(&state.context(), limit, offset)
        .await?;
    Ok(Json(charters))
}

async fn get_charter(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CharterDetail>, ShipmanError> {
    Ok(Json(
        state.db.charter_details().retrieve(&state.context(), id).await?,
    ))
}

async fn list_charter_voyages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Voyage>>, ShipmanError> {
    Ok(Json(
        state.db.voyages().list_by_charter(&state.context(), id).await?,
    ))
}

async fn list_charter_laytime(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LaytimeEntry>>, ShipmanError> {
    Ok(Json(
        state
            .db
            .laytime_entries()
            .list_by_charter(&state.context(), id)
            .await?,
    ))
}

async fn list_charter_payments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Payment>>, ShipmanError> {
    Ok(Json(
        state.db.payments().list_by_charter(&state.context(), id).await?,
    ))
}

async fn list_charter_disputes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Dispute>>, ShipmanError> {
    Ok(Json(
        state.db.disputes().list_by_charter(&state.context(), id).await?,
    ))
}

async fn list_charter_bills(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<BillOfLading>>, ShipmanError> {
    Ok(Json(
        state
            .db
            .bills_of_lading()
            .list_by_charter(&state.context(), id)
            .await?,
    ))
}

async fn list_charter_demurrage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<DemurrageRecord>>, ShipmanError> {
    Ok(Json(
        state
            .db
            .demurrage_records()
            .list_by_charter(&state.context(), id)
            .await?,
    ))
}

async fn get_voyage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Voyage>, ShipmanError> {
    Ok(Json(state.db.voyages().retrieve(&state.context(), id).await?))
}

async fn list_voyage_ports(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<VoyagePort>>, ShipmanError> {
    Ok(Json(
        state.db.voyage_ports().list_by_voyage(&state.context(), id).await?,
    ))
}

async fn list_voyage_positions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(track): Query<TrackQuery>,
) -> Result<Json<Vec<ShipPosition>>, ShipmanError> {
    let limit = track.limit.map(|l| l.clamp(1, MAX_PAGE_SIZE));
    Ok(Json(
        state
            .db
            .ship_positions()
            .list_by_voyage(&state.context(), id, limit)
            .await?,
    ))
}

async fn list_voyage_cargo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CargoLoad>>, ShipmanError> {
    Ok(Json(
        state.db.cargo_loads().list_by_voyage(&state.context(), id).await?,
    ))
}

async fn list_voyage_laytime(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LaytimeEntry>>, ShipmanError> {
    Ok(Json(
        state
            .db
            .laytime_entries()
            .list_by_voyage(&state.context(), id)
            .await?,
    ))
}
