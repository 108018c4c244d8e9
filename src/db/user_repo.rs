use sqlx::PgPool;
use uuid::Uuid;
use crate::common::error::AppError;

// Só o endereço de entrega; identidade e credenciais ficam no provedor externo
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_email(&self, user_id: Uuid) -> Result<Option<String>, AppError> {
        let email = sqlx::query_scalar::<_, String>("SELECT email FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(email)
    }
}
