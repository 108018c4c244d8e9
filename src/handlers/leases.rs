// src/handlers/leases.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        validation::{validate_not_negative, validate_positive},
    },
    config::AppState,
    middleware::auth::CurrentPrincipal,
    models::lease::Lease,
    services::{
        document_service::DocumentUpload,
        lease_service::{CreateLease, SignLease},
    },
};

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeasePayload {
    pub property_id: Uuid,
    pub tenant_id: Uuid,

    #[schema(example = "2026-02-01")]
    pub start_date: NaiveDate,
    #[schema(example = "2027-01-31")]
    pub end_date: NaiveDate,

    #[validate(custom(function = "validate_positive"))]
    #[schema(example = "1500.00")]
    pub monthly_rent: Decimal,

    // Se não vier, o contrato não tem caução
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    #[schema(example = "3000.00")]
    pub deposit_amount: Decimal,

    #[serde(default)]
    #[schema(value_type = Object)]
    pub document_content: serde_json::Value,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LeaseListQuery {
    /// Filtra pelos contratos de um imóvel
    pub property_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignLeasePayload {
    #[validate(length(min = 1, message = "A assinatura é obrigatória."))]
    pub signature_data: String,

    pub documents: Vec<DocumentUpload>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApproveLeasePayload {
    pub landlord_signature_data: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LandlordNotesPayload {
    #[validate(length(min = 1, message = "As observações são obrigatórias."))]
    pub notes: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TerminateLeasePayload {
    #[validate(length(min = 1, message = "O motivo é obrigatório."))]
    pub reason: String,
}

// ---
// Handlers
// ---

// POST /api/leases
#[utoipa::path(
    post,
    path = "/api/leases",
    tag = "Leases",
    request_body = CreateLeasePayload,
    responses(
        (status = 201, description = "Contrato criado em rascunho", body = Lease),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Imóvel de outro locador"),
        (status = 404, description = "Imóvel não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_lease(
    State(app_state): State<AppState>,
    principal: CurrentPrincipal,
    Json(payload): Json<CreateLeasePayload>,
) -> Result<impl IntoResponse, AppError> {
    principal.authenticated()?;
    payload.validate()?;

    let lease = app_state
        .lease_service
        .create_lease(
            principal.principal(),
            CreateLease {
                property_id: payload.property_id,
                tenant_id: payload.tenant_id,
                start_date: payload.start_date,
                end_date: payload.end_date,
                monthly_rent: payload.monthly_rent,
                deposit_amount: payload.deposit_amount,
                document_content: payload.document_content,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(lease)))
}

// GET /api/leases
#[utoipa::path(
    get,
    path = "/api/leases",
    tag = "Leases",
    params(LeaseListQuery),
    responses(
        (status = 200, description = "Contratos visíveis para o usuário", body = Vec<Lease>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_leases(
    State(app_state): State<AppState>,
    principal: CurrentPrincipal,
    Query(query): Query<LeaseListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let leases = app_state
        .lease_service
        .list_leases(principal.principal(), query.property_id)
        .await?;

    Ok(Json(leases))
}

// GET /api/leases/{id}
#[utoipa::path(
    get,
    path = "/api/leases/{id}",
    tag = "Leases",
    params(("id" = Uuid, Path, description = "ID do Contrato")),
    responses(
        (status = 200, description = "Contrato", body = Lease),
        (status = 404, description = "Contrato não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_lease(
    State(app_state): State<AppState>,
    principal: CurrentPrincipal,
    Path(lease_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let lease = app_state.lease_service.get_lease(principal.principal(), lease_id).await?;
    Ok(Json(lease))
}

// POST /api/leases/{id}/send
#[utoipa::path(
    post,
    path = "/api/leases/{id}/send",
    tag = "Leases",
    params(("id" = Uuid, Path, description = "ID do Contrato")),
    responses(
        (status = 200, description = "Contrato enviado ao inquilino", body = Lease),
        (status = 409, description = "Contrato não está em rascunho")
    ),
    security(("api_jwt" = []))
)]
pub async fn send_lease(
    State(app_state): State<AppState>,
    principal: CurrentPrincipal,
    Path(lease_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let lease = app_state.lease_service.send(principal.principal(), lease_id).await?;
    Ok(Json(lease))
}

// POST /api/leases/{id}/sign
#[utoipa::path(
    post,
    path = "/api/leases/{id}/sign",
    tag = "Leases",
    request_body = SignLeasePayload,
    params(("id" = Uuid, Path, description = "ID do Contrato")),
    responses(
        (status = 200, description = "Contrato assinado pelo inquilino", body = Lease),
        (status = 400, description = "Assinatura ou documentos inválidos"),
        (status = 409, description = "Contrato não aguarda assinatura")
    ),
    security(("api_jwt" = []))
)]
pub async fn sign_lease(
    State(app_state): State<AppState>,
    principal: CurrentPrincipal,
    Path(lease_id): Path<Uuid>,
    Json(payload): Json<SignLeasePayload>,
) -> Result<impl IntoResponse, AppError> {
    principal.authenticated()?;
    payload.validate()?;

    let lease = app_state
        .lease_service
        .sign(
            principal.principal(),
            lease_id,
            SignLease { signature_data: payload.signature_data, documents: payload.documents },
        )
        .await?;

    Ok(Json(lease))
}

// POST /api/leases/{id}/approve
#[utoipa::path(
    post,
    path = "/api/leases/{id}/approve",
    tag = "Leases",
    request_body = ApproveLeasePayload,
    params(("id" = Uuid, Path, description = "ID do Contrato")),
    responses(
        (status = 200, description = "Contrato aprovado; imóvel indisponível e primeira cobrança criada", body = Lease),
        (status = 409, description = "Contrato não assinado ou imóvel já alugado")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_lease(
    State(app_state): State<AppState>,
    principal: CurrentPrincipal,
    Path(lease_id): Path<Uuid>,
    Json(payload): Json<ApproveLeasePayload>,
) -> Result<impl IntoResponse, AppError> {
    let lease = app_state
        .lease_service
        .approve(principal.principal(), lease_id, payload.landlord_signature_data)
        .await?;

    Ok(Json(lease))
}

// POST /api/leases/{id}/reject
#[utoipa::path(
    post,
    path = "/api/leases/{id}/reject",
    tag = "Leases",
    request_body = LandlordNotesPayload,
    params(("id" = Uuid, Path, description = "ID do Contrato")),
    responses(
        (status = 200, description = "Contrato rejeitado", body = Lease),
        (status = 409, description = "Contrato não assinado")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_lease(
    State(app_state): State<AppState>,
    principal: CurrentPrincipal,
    Path(lease_id): Path<Uuid>,
    Json(payload): Json<LandlordNotesPayload>,
) -> Result<impl IntoResponse, AppError> {
    principal.authenticated()?;
    payload.validate()?;

    let lease = app_state
        .lease_service
        .reject(principal.principal(), lease_id, &payload.notes)
        .await?;

    Ok(Json(lease))
}

// POST /api/leases/{id}/request-revision
#[utoipa::path(
    post,
    path = "/api/leases/{id}/request-revision",
    tag = "Leases",
    request_body = LandlordNotesPayload,
    params(("id" = Uuid, Path, description = "ID do Contrato")),
    responses(
        (status = 200, description = "Revisão solicitada; assinatura e documentos descartados", body = Lease),
        (status = 409, description = "Contrato não assinado")
    ),
    security(("api_jwt" = []))
)]
pub async fn request_revision(
    State(app_state): State<AppState>,
    principal: CurrentPrincipal,
    Path(lease_id): Path<Uuid>,
    Json(payload): Json<LandlordNotesPayload>,
) -> Result<impl IntoResponse, AppError> {
    principal.authenticated()?;
    payload.validate()?;

    let lease = app_state
        .lease_service
        .request_revision(principal.principal(), lease_id, &payload.notes)
        .await?;

    Ok(Json(lease))
}

// POST /api/leases/{id}/terminate
#[utoipa::path(
    post,
    path = "/api/leases/{id}/terminate",
    tag = "Leases",
    request_body = TerminateLeasePayload,
    params(("id" = Uuid, Path, description = "ID do Contrato")),
    responses(
        (status = 200, description = "Contrato encerrado", body = Lease),
        (status = 409, description = "Contrato já encerrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn terminate_lease(
    State(app_state): State<AppState>,
    principal: CurrentPrincipal,
    Path(lease_id): Path<Uuid>,
    Json(payload): Json<TerminateLeasePayload>,
) -> Result<impl IntoResponse, AppError> {
    principal.authenticated()?;
    payload.validate()?;

    let lease = app_state
        .lease_service
        .terminate(principal.principal(), lease_id, &payload.reason)
        .await?;

    Ok(Json(lease))
}
