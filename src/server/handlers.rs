use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::catalog::{self, Stadium};
use crate::error::ReportError;
use crate::report::{Report, ReportSubject};
use crate::services::{approx_distance_m, ResolvedService, ServiceCategory};

use super::state::AppState;

// ─── Error response ──────────────────────────────────────────────

#[derive(Serialize)]
struct ApiErrorBody {
    error: String,
    code: u16,
}

#[derive(Debug)]
pub(super) struct ApiError(StatusCode, String);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            error: self.1,
            code: self.0.as_u16(),
        };
        (self.0, Json(body)).into_response()
    }
}

fn api_error(status: StatusCode, msg: impl Into<String>) -> ApiError {
    ApiError(status, msg.into())
}

// ─── GET /api/stadiums ───────────────────────────────────────────

pub async fn stadium_list() -> Json<&'static [Stadium]> {
    Json(catalog::stadiums())
}

// ─── GET /api/categories ─────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct CategoryInfo {
    pub id: ServiceCategory,
    pub title: &'static str,
    pub glyph: &'static str,
}

pub async fn category_list() -> Json<Vec<CategoryInfo>> {
    Json(
        ServiceCategory::ALL
            .iter()
            .map(|c| CategoryInfo {
                id: *c,
                title: c.title(),
                glyph: c.glyph(),
            })
            .collect(),
    )
}

// ─── GET /api/services ───────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct ServicesQuery {
    pub category: Option<String>,
    /// Stadium id to measure distance from.
    pub near: Option<String>,
    /// Radius around `near`, in meters.
    pub within_m: Option<f64>,
}

#[derive(Serialize, Debug)]
pub struct ServicesResponse {
    /// False until the first resolution run has published.
    pub ready: bool,
    /// A resolution run is in flight; `services` may be replaced soon.
    pub resolving: bool,
    pub count: usize,
    pub services: Vec<ResolvedService>,
}

pub async fn service_list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ServicesQuery>,
) -> Result<Json<ServicesResponse>, ApiError> {
    let start = Instant::now();

    let category = match params.category.as_deref() {
        Some(raw) => Some(ServiceCategory::parse(raw).ok_or_else(|| {
            api_error(StatusCode::BAD_REQUEST, format!("Unknown category '{}'", raw))
        })?),
        None => None,
    };

    let origin = match params.near.as_deref() {
        Some(id) => Some(catalog::stadium(id).ok_or_else(|| {
            api_error(StatusCode::BAD_REQUEST, format!("Unknown stadium '{}'", id))
        })?),
        None => None,
    };
    if let Some(radius) = params.within_m {
        if origin.is_none() {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "'within_m' requires 'near'",
            ));
        }
        if !radius.is_finite() || radius < 0.0 {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                format!("'within_m' must be a non-negative number, got {}", radius),
            ));
        }
    }

    let snapshot = state.services.current();
    let ready = snapshot.is_some();
    let services: Vec<ResolvedService> = snapshot
        .iter()
        .flat_map(|list| list.iter())
        .filter(|s| category.map_or(true, |c| s.category == c))
        .filter(|s| match (origin, params.within_m) {
            (Some(stadium), Some(radius)) => {
                approx_distance_m(stadium.coordinate, s.coordinate) <= radius
            }
            _ => true,
        })
        .cloned()
        .collect();

    info!(
        ready,
        count = services.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "GET /api/services"
    );

    Ok(Json(ServicesResponse {
        ready,
        resolving: state.services.is_resolving(),
        count: services.len(),
        services,
    }))
}

// ─── POST /api/services/refresh ──────────────────────────────────

#[derive(Serialize, Debug)]
pub struct RefreshResponse {
    pub started: bool,
    /// A run was still in flight and has been aborted in favor of this one.
    pub superseded: bool,
    pub addresses: usize,
}

pub async fn refresh_services(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<RefreshResponse>) {
    let superseded = state.services.is_resolving();
    // The model keeps track of the run; the handle is not needed here.
    let _ = state.services.request(state.addresses.clone());
    info!(
        addresses = state.addresses.len(),
        superseded,
        "POST /api/services/refresh"
    );
    (
        StatusCode::ACCEPTED,
        Json(RefreshResponse {
            started: true,
            superseded,
            addresses: state.addresses.len(),
        }),
    )
}

// ─── POST /api/reports ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct ReportRequest {
    pub email: Option<String>,
    pub user: Option<String>,
    /// Stadium id; stamps the report in the venue's local time.
    pub stadium: Option<String>,
    #[serde(flatten)]
    pub subject: ReportSubject,
    pub comment: String,
}

#[derive(Serialize, Debug)]
pub struct ReportResponse {
    pub ok: bool,
}

pub async fn submit_report(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ReportRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    let tz = match req.stadium.as_deref() {
        Some(id) => {
            let stadium = catalog::stadium(id).ok_or_else(|| {
                api_error(StatusCode::BAD_REQUEST, format!("Unknown stadium '{}'", id))
            })?;
            stadium.tz.parse::<chrono_tz::Tz>().ok()
        }
        None => None,
    };

    let report = Report::new(
        req.email.as_deref(),
        &req.subject,
        req.user.as_deref(),
        &req.comment,
        Utc::now(),
        tz,
    )
    .map_err(report_error)?;

    state.reports.submit(&report).await.map_err(report_error)?;
    info!(place = %req.subject.title, "POST /api/reports -> delivered");
    Ok(Json(ReportResponse { ok: true }))
}

fn report_error(e: ReportError) -> ApiError {
    let status = match e {
        ReportError::EmptyComment => StatusCode::BAD_REQUEST,
        ReportError::Network(_) | ReportError::Rejected(_) => StatusCode::BAD_GATEWAY,
    };
    api_error(status, e.user_message())
}
