// src/handlers/maintenance.rs

use axum::{extract::State, response::IntoResponse, Json};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::{authz::require_admin, error::AppError},
    config::AppState,
    middleware::auth::CurrentPrincipal,
    services::SweepReport,
};

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunSweepsPayload {
    /// Data de referência. Padrão: hoje (UTC).
    pub today: Option<NaiveDate>,
}

// POST /api/maintenance/sweeps
#[utoipa::path(
    post,
    path = "/api/maintenance/sweeps",
    tag = "Maintenance",
    request_body = RunSweepsPayload,
    responses(
        (status = 200, description = "Varreduras executadas", body = SweepReport),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn run_sweeps(
    State(app_state): State<AppState>,
    principal: CurrentPrincipal,
    Json(payload): Json<RunSweepsPayload>,
) -> Result<impl IntoResponse, AppError> {
    let admin = require_admin(principal.principal())?;
    let today = payload.today.unwrap_or_else(|| Utc::now().date_naive());

    tracing::info!(admin_id = %admin.id, %today, "Varredura manual solicitada");

    let report = app_state.sweep_service.run_all(today).await?;
    Ok(Json(report))
}
