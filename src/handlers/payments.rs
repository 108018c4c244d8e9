// src/handlers/payments.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::CurrentPrincipal,
    models::payment::Payment,
};

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSchedulePayload {
    /// Meses a partir do primeiro vencimento. Padrão: configuração do servidor.
    #[validate(range(min = 1, max = 120, message = "O horizonte deve estar entre 1 e 120 meses."))]
    #[schema(example = 12)]
    pub horizon_months: Option<u32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkPaidPayload {
    #[validate(length(min = 1, message = "A forma de pagamento é obrigatória."))]
    #[schema(example = "pix")]
    pub method: String,

    pub reference: Option<String>,
}

// GET /api/leases/{id}/payments
#[utoipa::path(
    get,
    path = "/api/leases/{id}/payments",
    tag = "Payments",
    params(("id" = Uuid, Path, description = "ID do Contrato")),
    responses(
        (status = 200, description = "Cobranças do contrato, por vencimento", body = Vec<Payment>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_payments(
    State(app_state): State<AppState>,
    principal: CurrentPrincipal,
    Path(lease_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let payments = app_state
        .payment_service
        .list_payments(principal.principal(), lease_id)
        .await?;

    Ok(Json(payments))
}

// POST /api/leases/{id}/payments/schedule
#[utoipa::path(
    post,
    path = "/api/leases/{id}/payments/schedule",
    tag = "Payments",
    request_body = GenerateSchedulePayload,
    params(("id" = Uuid, Path, description = "ID do Contrato")),
    responses(
        (status = 201, description = "Cobranças criadas nesta chamada (vazio se já existiam)", body = Vec<Payment>),
        (status = 409, description = "Contrato não aprovado")
    ),
    security(("api_jwt" = []))
)]
pub async fn generate_schedule(
    State(app_state): State<AppState>,
    principal: CurrentPrincipal,
    Path(lease_id): Path<Uuid>,
    Json(payload): Json<GenerateSchedulePayload>,
) -> Result<impl IntoResponse, AppError> {
    principal.authenticated()?;
    payload.validate()?;

    let created = app_state
        .payment_service
        .generate_schedule(principal.principal(), lease_id, payload.horizon_months)
        .await?;

    Ok((StatusCode::CREATED, Json(created)))
}

// POST /api/payments/{id}/mark-paid
#[utoipa::path(
    post,
    path = "/api/payments/{id}/mark-paid",
    tag = "Payments",
    request_body = MarkPaidPayload,
    params(("id" = Uuid, Path, description = "ID da Cobrança")),
    responses(
        (status = 200, description = "Cobrança quitada", body = Payment),
        (status = 409, description = "Cobrança já quitada")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_paid(
    State(app_state): State<AppState>,
    principal: CurrentPrincipal,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<MarkPaidPayload>,
) -> Result<impl IntoResponse, AppError> {
    principal.authenticated()?;
    payload.validate()?;

    let payment = app_state
        .payment_service
        .mark_paid(principal.principal(), payment_id, &payload.method, payload.reference.as_deref())
        .await?;

    Ok(Json(payment))
}
