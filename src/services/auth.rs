// src/services/auth.rs

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    models::auth::{Claims, Principal},
};

/// Identity Gate: o núcleo só confia no que vem assinado com o segredo.
/// Emissão de tokens (login) é responsabilidade do provedor de identidade.
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
}

impl AuthService {
    pub fn new(jwt_secret: String) -> Self {
        Self { jwt_secret }
    }

    /// Token ausente, expirado ou adulterado resolve para `None`.
    pub fn resolve_principal(&self, token: &str) -> Option<Principal> {
        let validation = Validation::default();

        match decode::<Claims>(token, &DecodingKey::from_secret(self.jwt_secret.as_ref()), &validation) {
            Ok(token_data) => Some(Principal::new(token_data.claims.sub, token_data.claims.role)),
            Err(e) => {
                tracing::debug!("Token rejeitado: {}", e);
                None
            }
        }
    }

    pub fn issue_token(&self, principal: &Principal, ttl: chrono::Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + ttl;

        let claims = Claims {
            sub: principal.id,
            role: principal.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
