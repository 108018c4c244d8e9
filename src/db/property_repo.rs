// src/db/property_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::property::{AvailabilityDrift, Property},
};

#[derive(Clone)]
pub struct PropertyRepository {
    pool: PgPool,
}

impl PropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, property_id: Uuid) -> Result<Option<Property>, AppError> {
        let property = sqlx::query_as::<_, Property>("SELECT * FROM properties WHERE id = $1")
            .bind(property_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(property)
    }

    pub async fn set_availability<'e, E>(
        &self,
        executor: E,
        property_id: Uuid,
        is_available: bool,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE properties SET is_available = $2, updated_at = NOW() WHERE id = $1",
        )
            .bind(property_id)
            .bind(is_available)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Imóvel"));
        }

        Ok(())
    }

    // Imóveis cuja flag não bate com os contratos:
    //  - disponível com contrato aprovado  -> deveria estar indisponível
    //  - indisponível, sem contrato aprovado, e com um contrato que chegou a ser
    //    aprovado e foi encerrado/expirado depois da última alteração do imóvel
    //    -> deveria estar disponível
    pub async fn find_availability_drift(&self) -> Result<Vec<AvailabilityDrift>, AppError> {
        let drift = sqlx::query_as::<_, AvailabilityDrift>(
            r#"
            SELECT p.id AS property_id, FALSE AS expected_available
            FROM properties p
            WHERE p.is_available
              AND EXISTS (
                  SELECT 1 FROM leases l
                  WHERE l.property_id = p.id AND l.status = 'approved'
              )
            UNION ALL
            SELECT p.id AS property_id, TRUE AS expected_available
            FROM properties p
            WHERE NOT p.is_available
              AND NOT EXISTS (
                  SELECT 1 FROM leases l
                  WHERE l.property_id = p.id AND l.status = 'approved'
              )
              AND EXISTS (
                  SELECT 1 FROM leases l
                  WHERE l.property_id = p.id
                    AND l.status IN ('terminated', 'expired')
                    AND l.approved_at IS NOT NULL
                    AND l.updated_at > p.updated_at
              )
            "#,
        )
            .fetch_all(&self.pool)
            .await?;

        Ok(drift)
    }
}
