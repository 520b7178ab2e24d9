/**
 * API REST NETPULSE - Serveur HTTP du kernel
 *
 * RÔLE :
 * Adaptateur fin entre le dashboard et la Fleet (registre + échantillonneur).
 * Aucune logique métier ici : décodage JSON, appel Fleet, code HTTP.
 *
 * ROUTES :
 * - /health, /system/health           : supervision
 * - /api/devices[/{id}[/status]]      : CRUD appareils
 * - /api/devices/summary              : totaux par statut et par type
 * - /api/active-clients               : série glissante des clients actifs
 *
 * ERREURS : NotFound -> 404, statut invalide -> 400, JSON malformé -> rejet Axum.
 */

use anyhow::Context;
use axum::extract::{Path, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::CorsConf;
use crate::health::KernelHealth;
use crate::models::{Device, DeviceSummary, NewDevice, Sample, StatusUpdate};
use crate::registry::RegistryError;
use crate::state::AppState;

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        let (code, msg) = match &self {
            RegistryError::NotFound(_) => (StatusCode::NOT_FOUND, "Device not found"),
            RegistryError::InvalidStatus(_) => (
                StatusCode::BAD_REQUEST,
                "Invalid status. Must be either Active or Inactive",
            ),
        };
        tracing::warn!(error = %self, "request rejected");
        (code, msg).into_response()
    }
}

pub fn build_cors_layer(conf: &CorsConf) -> anyhow::Result<CorsLayer> {
    let origins = conf
        .allowed_origins
        .iter()
        .map(|o| o.parse::<HeaderValue>().with_context(|| format!("invalid CORS origin '{o}'")))
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS, Method::PATCH])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]))
}

pub fn build_router(app_state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/system/health", get(get_system_health))
        .route("/api/devices", get(list_devices).post(add_device))
        .route("/api/devices/summary", get(device_summary))
        .route("/api/devices/{id}", get(get_device).delete(remove_device))
        .route("/api/devices/{id}/status", patch(update_device_status))
        .route("/api/active-clients", get(active_clients))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// GET /api/devices
async fn list_devices(State(app): State<AppState>) -> Json<Vec<Device>> {
    let devices = app.fleet.list();
    tracing::debug!(count = devices.len(), "returned devices");
    Json(devices)
}

// POST /api/devices
async fn add_device(
    State(app): State<AppState>,
    Json(body): Json<NewDevice>,
) -> (StatusCode, Json<Device>) {
    let device = app.fleet.add(&body.name, &body.device_type);
    (StatusCode::CREATED, Json(device))
}

// GET /api/devices/{id}
async fn get_device(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Device>, RegistryError> {
    app.fleet.get(&id).map(Json)
}

// DELETE /api/devices/{id}
async fn remove_device(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, RegistryError> {
    app.fleet.remove(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

// PATCH /api/devices/{id}/status
async fn update_device_status(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusUpdate>,
) -> Result<Json<Device>, RegistryError> {
    app.fleet.update_status(&id, &body.status).map(Json)
}

// GET /api/devices/summary
async fn device_summary(State(app): State<AppState>) -> Json<DeviceSummary> {
    Json(app.fleet.summary())
}

// GET /api/active-clients
async fn active_clients(State(app): State<AppState>) -> Json<Vec<Sample>> {
    Json(app.fleet.series())
}

// GET /system/health
async fn get_system_health(State(app): State<AppState>) -> Json<KernelHealth> {
    Json(app.health_tracker.get_health(&app.fleet))
}
