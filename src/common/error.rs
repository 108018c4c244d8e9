use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Taxonomia única de erros do núcleo. Tudo que não é infraestrutura é detectado
// antes de qualquer escrita e devolvido ao chamador como está.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Autenticação necessária")]
    Unauthenticated,

    #[error("Acesso negado: {0}")]
    Unauthorized(String),

    #[error("{0} não encontrado(a)")]
    NotFound(&'static str),

    #[error("Operação inválida para o status atual: {0}")]
    InvalidState(String),

    #[error("Dados inválidos: {0}")]
    Validation(String),

    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Registro já existe: {0}")]
    AlreadyExists(String),

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidState(_) | AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::Validation(_) | AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::DatabaseError(_) | AppError::JwtError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                })
            }
            // Infraestrutura vira 500 genérico; o detalhe fica só no log.
            ref e if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                json!({ "error": "Ocorreu um erro inesperado." })
            }
            e => json!({ "error": e.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_taxonomy_to_status_codes() {
        assert_eq!(AppError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Unauthorized("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("Contrato").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::InvalidState("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::AlreadyExists("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn invalid_state_message_names_the_precondition() {
        let err = AppError::InvalidState("o contrato não está pronto para assinatura".into());
        assert!(err.to_string().contains("não está pronto para assinatura"));
    }
}
