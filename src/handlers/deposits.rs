// src/handlers/deposits.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        validation::{validate_not_negative, validate_positive},
    },
    config::AppState,
    middleware::auth::CurrentPrincipal,
    models::deposit::Deposit,
};

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepositPayload {
    /// Padrão: o valor de caução do contrato.
    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "3000.00")]
    pub amount: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmDepositPayload {
    #[validate(length(min = 1, message = "A forma de pagamento é obrigatória."))]
    #[schema(example = "bank_transfer")]
    pub method: String,

    pub reference: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RequestReleasePayload {
    pub note: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseDepositPayload {
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "250.00")]
    pub deduction_amount: Option<Decimal>,

    /// Obrigatório quando há desconto.
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ForfeitDepositPayload {
    #[validate(length(min = 1, message = "O motivo é obrigatório."))]
    pub reason: String,
}

// GET /api/leases/{id}/deposit
#[utoipa::path(
    get,
    path = "/api/leases/{id}/deposit",
    tag = "Deposits",
    params(("id" = Uuid, Path, description = "ID do Contrato")),
    responses(
        (status = 200, description = "Caução do contrato", body = Deposit),
        (status = 404, description = "Contrato sem caução")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_deposit(
    State(app_state): State<AppState>,
    principal: CurrentPrincipal,
    Path(lease_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deposit = app_state
        .deposit_service
        .get_for_lease(principal.principal(), lease_id)
        .await?;

    Ok(Json(deposit))
}

// POST /api/leases/{id}/deposit
#[utoipa::path(
    post,
    path = "/api/leases/{id}/deposit",
    tag = "Deposits",
    request_body = CreateDepositPayload,
    params(("id" = Uuid, Path, description = "ID do Contrato")),
    responses(
        (status = 201, description = "Caução aberta como pendente", body = Deposit),
        (status = 409, description = "O contrato já possui caução")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_deposit(
    State(app_state): State<AppState>,
    principal: CurrentPrincipal,
    Path(lease_id): Path<Uuid>,
    Json(payload): Json<CreateDepositPayload>,
) -> Result<impl IntoResponse, AppError> {
    principal.authenticated()?;
    payload.validate()?;

    let deposit = app_state
        .deposit_service
        .create(principal.principal(), lease_id, payload.amount)
        .await?;

    Ok((StatusCode::CREATED, Json(deposit)))
}

// POST /api/deposits/{id}/confirm
#[utoipa::path(
    post,
    path = "/api/deposits/{id}/confirm",
    tag = "Deposits",
    request_body = ConfirmDepositPayload,
    params(("id" = Uuid, Path, description = "ID da Caução")),
    responses(
        (status = 200, description = "Recebimento confirmado; caução em custódia", body = Deposit),
        (status = 409, description = "Caução não está pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn confirm_deposit(
    State(app_state): State<AppState>,
    principal: CurrentPrincipal,
    Path(deposit_id): Path<Uuid>,
    Json(payload): Json<ConfirmDepositPayload>,
) -> Result<impl IntoResponse, AppError> {
    principal.authenticated()?;
    payload.validate()?;

    let deposit = app_state
        .deposit_service
        .confirm(principal.principal(), deposit_id, &payload.method, payload.reference.as_deref())
        .await?;

    Ok(Json(deposit))
}

// POST /api/deposits/{id}/request-release
#[utoipa::path(
    post,
    path = "/api/deposits/{id}/request-release",
    tag = "Deposits",
    request_body = RequestReleasePayload,
    params(("id" = Uuid, Path, description = "ID da Caução")),
    responses(
        (status = 200, description = "Pedido de devolução registrado", body = Deposit),
        (status = 409, description = "Caução não está em custódia")
    ),
    security(("api_jwt" = []))
)]
pub async fn request_release(
    State(app_state): State<AppState>,
    principal: CurrentPrincipal,
    Path(deposit_id): Path<Uuid>,
    Json(payload): Json<RequestReleasePayload>,
) -> Result<impl IntoResponse, AppError> {
    let deposit = app_state
        .deposit_service
        .request_release(principal.principal(), deposit_id, payload.note.as_deref())
        .await?;

    Ok(Json(deposit))
}

// POST /api/deposits/{id}/release
#[utoipa::path(
    post,
    path = "/api/deposits/{id}/release",
    tag = "Deposits",
    request_body = ReleaseDepositPayload,
    params(("id" = Uuid, Path, description = "ID da Caução")),
    responses(
        (status = 200, description = "Caução devolvida (total ou parcial)", body = Deposit),
        (status = 400, description = "Desconto inválido"),
        (status = 409, description = "Caução não está em custódia")
    ),
    security(("api_jwt" = []))
)]
pub async fn release_deposit(
    State(app_state): State<AppState>,
    principal: CurrentPrincipal,
    Path(deposit_id): Path<Uuid>,
    Json(payload): Json<ReleaseDepositPayload>,
) -> Result<impl IntoResponse, AppError> {
    principal.authenticated()?;
    payload.validate()?;

    let deposit = app_state
        .deposit_service
        .release(
            principal.principal(),
            deposit_id,
            payload.deduction_amount,
            payload.reason.as_deref(),
        )
        .await?;

    Ok(Json(deposit))
}

// POST /api/deposits/{id}/forfeit
#[utoipa::path(
    post,
    path = "/api/deposits/{id}/forfeit",
    tag = "Deposits",
    request_body = ForfeitDepositPayload,
    params(("id" = Uuid, Path, description = "ID da Caução")),
    responses(
        (status = 200, description = "Caução retida", body = Deposit),
        (status = 409, description = "Caução não está em custódia")
    ),
    security(("api_jwt" = []))
)]
pub async fn forfeit_deposit(
    State(app_state): State<AppState>,
    principal: CurrentPrincipal,
    Path(deposit_id): Path<Uuid>,
    Json(payload): Json<ForfeitDepositPayload>,
) -> Result<impl IntoResponse, AppError> {
    principal.authenticated()?;
    payload.validate()?;

    let deposit = app_state
        .deposit_service
        .forfeit(principal.principal(), deposit_id, &payload.reason)
        .await?;

    Ok(Json(deposit))
}
