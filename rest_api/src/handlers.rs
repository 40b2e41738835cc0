// rest_api/src/handlers.rs

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use rx_models::{
    ApiResponse, DoctorView, PrescriptionPayload, PrescriptionView, ReportFilters, ReportRequest,
    ReportResponse,
};

use crate::error::ApiError;
use crate::AppState;

pub const PRESCRIPTION_DELETED: &str = "Prescription deleted successfully";

type JsonBody<T> = Result<Json<T>, JsonRejection>;

// Handler for GET /api/prescriptions
pub async fn list_prescriptions_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<PrescriptionView>>>, ApiError> {
    let prescriptions = state.service.list().await?;
    Ok(Json(ApiResponse::ok(prescriptions)))
}

// Handler for POST /api/prescriptions
pub async fn create_prescription_handler(
    State(state): State<AppState>,
    payload: JsonBody<PrescriptionPayload>,
) -> Result<(StatusCode, Json<ApiResponse<PrescriptionView>>), ApiError> {
    let Json(payload) = payload?;
    let created = state.service.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(created))))
}

// Handler for PUT /api/prescriptions/:id
pub async fn update_prescription_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: JsonBody<PrescriptionPayload>,
) -> Result<Json<ApiResponse<PrescriptionView>>, ApiError> {
    let Json(payload) = payload?;
    let updated = state.service.update(&id, &payload).await?;
    Ok(Json(ApiResponse::ok(updated)))
}

// Handler for DELETE /api/prescriptions/:id
pub async fn delete_prescription_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let removed = state.service.delete(&id).await?;
    info!("Deleted prescription {}", removed.id);
    Ok(Json(ApiResponse::message(PRESCRIPTION_DELETED)))
}

// Handler for GET /api/doctors
pub async fn list_doctors_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<DoctorView>>>, ApiError> {
    let doctors = state.service.list_doctors().await?;
    Ok(Json(ApiResponse::ok(doctors)))
}

// Handler for POST /api/reports
pub async fn report_handler(
    State(state): State<AppState>,
    request: JsonBody<ReportRequest>,
) -> Result<Json<ReportResponse>, ApiError> {
    let Json(request) = request?;
    let report = state.service.report(&request).await?;
    Ok(Json(ReportResponse {
        success: true,
        data: report.prescriptions,
        stats: report.stats,
    }))
}

// Handler for GET /api/report-filters
pub async fn report_filters_handler(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ReportFilters>>, ApiError> {
    let filters = state.service.report_filters().await?;
    Ok(Json(ApiResponse::ok(filters)))
}

// Handler for GET /api/health
pub async fn health_check_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "message": "Prescription API is healthy",
            "storage": state.service.storage().get_type(),
        })),
    )
}
