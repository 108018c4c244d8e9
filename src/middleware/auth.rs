// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{common::error::AppError, config::AppState, models::auth::Principal};

/// Principal resolvido a partir do `Authorization: Bearer`.
/// Sem cabeçalho, ou com token inválido, o valor é `None`: quem decide se isso
/// é um erro é o serviço, via `can_act`.
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub Option<Principal>);

impl CurrentPrincipal {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }

    /// Para handlers que validam o corpo: sem principal a resposta é 401,
    /// nunca um erro de validação.
    pub fn authenticated(&self) -> Result<&Principal, AppError> {
        self.principal().ok_or(AppError::Unauthenticated)
    }
}

impl<S> FromRequestParts<S> for CurrentPrincipal
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let bearer = TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .ok();

        let principal = bearer.and_then(|TypedHeader(Authorization(token))| {
            app_state.auth_service.resolve_principal(token.token())
        });

        Ok(CurrentPrincipal(principal))
    }
}
