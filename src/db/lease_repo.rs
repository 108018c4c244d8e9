// src/db/lease_repo.rs

use chrono::NaiveDate;
use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::lease::{Lease, LeaseChange, LeaseFilter, LeaseStatus, NewLease},
};

#[derive(Clone)]
pub struct LeaseRepository {
    pool: PgPool,
}

impl LeaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_lease<'e, E>(&self, executor: E, lease: &NewLease) -> Result<Lease, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, Lease>(
            r#"
            INSERT INTO leases (
                property_id, tenant_id, landlord_id,
                start_date, end_date, monthly_rent, deposit_amount,
                document_content
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
            .bind(lease.property_id)
            .bind(lease.tenant_id)
            .bind(lease.landlord_id)
            .bind(lease.start_date)
            .bind(lease.end_date)
            .bind(lease.monthly_rent)
            .bind(lease.deposit_amount)
            .bind(&lease.document_content)
            .fetch_one(executor)
            .await?;

        Ok(created)
    }

    pub async fn find_by_id(&self, lease_id: Uuid) -> Result<Option<Lease>, AppError> {
        let lease = sqlx::query_as::<_, Lease>("SELECT * FROM leases WHERE id = $1")
            .bind(lease_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(lease)
    }

    pub async fn list(&self, filter: &LeaseFilter) -> Result<Vec<Lease>, AppError> {
        let leases = sqlx::query_as::<_, Lease>(
            r#"
            SELECT * FROM leases
            WHERE ($1::uuid IS NULL OR landlord_id = $1)
              AND ($2::uuid IS NULL OR tenant_id = $2)
              AND ($3::uuid IS NULL OR property_id = $3)
            ORDER BY created_at DESC
            "#,
        )
            .bind(filter.landlord_id)
            .bind(filter.tenant_id)
            .bind(filter.property_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(leases)
    }

    pub async fn find_approved_for_property<'e, E>(
        &self,
        executor: E,
        property_id: Uuid,
    ) -> Result<Option<Lease>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lease = sqlx::query_as::<_, Lease>(
            "SELECT * FROM leases WHERE property_id = $1 AND status = 'approved' LIMIT 1",
        )
            .bind(property_id)
            .fetch_optional(executor)
            .await?;

        Ok(lease)
    }

    pub async fn list_expirable(&self, today: NaiveDate) -> Result<Vec<Lease>, AppError> {
        let leases = sqlx::query_as::<_, Lease>(
            r#"
            SELECT * FROM leases
            WHERE status = 'approved' AND end_date < $1
            ORDER BY end_date ASC
            "#,
        )
            .bind(today)
            .fetch_all(&self.pool)
            .await?;

        Ok(leases)
    }

    // Escrita condicional: só grava se o status ainda for o lido pelo serviço.
    // `None` significa que outra requisição já moveu o contrato.
    pub async fn apply_change<'e, E>(
        &self,
        executor: E,
        lease_id: Uuid,
        expected: LeaseStatus,
        change: &LeaseChange,
    ) -> Result<Option<Lease>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let status = change.status();

        let query = match change {
            LeaseChange::Sent { sent_at } => sqlx::query_as::<_, Lease>(
                r#"
                UPDATE leases
                SET status = $3, sent_at = $4, updated_at = NOW()
                WHERE id = $1 AND status = $2
                RETURNING *
                "#,
            )
                .bind(lease_id)
                .bind(expected)
                .bind(status)
                .bind(*sent_at),

            LeaseChange::Signed { signature, documents, signed_at } => sqlx::query_as::<_, Lease>(
                r#"
                UPDATE leases
                SET status = $3, tenant_signature_data = $4, tenant_documents = $5,
                    signed_at = $6, updated_at = NOW()
                WHERE id = $1 AND status = $2
                RETURNING *
                "#,
            )
                .bind(lease_id)
                .bind(expected)
                .bind(status)
                .bind(signature.clone())
                .bind(Json(documents.clone()))
                .bind(*signed_at),

            LeaseChange::Approved { approved_at, landlord_signature } => sqlx::query_as::<_, Lease>(
                r#"
                UPDATE leases
                SET status = $3, approved_at = $4,
                    landlord_signature_data = COALESCE($5, landlord_signature_data),
                    updated_at = NOW()
                WHERE id = $1 AND status = $2
                RETURNING *
                "#,
            )
                .bind(lease_id)
                .bind(expected)
                .bind(status)
                .bind(*approved_at)
                .bind(landlord_signature.clone()),

            LeaseChange::Rejected { notes } => sqlx::query_as::<_, Lease>(
                r#"
                UPDATE leases
                SET status = $3, landlord_notes = $4, updated_at = NOW()
                WHERE id = $1 AND status = $2
                RETURNING *
                "#,
            )
                .bind(lease_id)
                .bind(expected)
                .bind(status)
                .bind(notes.clone()),

            // Limpa o ciclo de assinatura anterior junto com a mudança de status
            LeaseChange::RevisionRequested { notes } => sqlx::query_as::<_, Lease>(
                r#"
                UPDATE leases
                SET status = $3, landlord_notes = $4,
                    tenant_signature_data = NULL, tenant_documents = '[]'::jsonb, signed_at = NULL,
                    updated_at = NOW()
                WHERE id = $1 AND status = $2
                RETURNING *
                "#,
            )
                .bind(lease_id)
                .bind(expected)
                .bind(status)
                .bind(notes.clone()),

            LeaseChange::Terminated { reason, terminated_at } => sqlx::query_as::<_, Lease>(
                r#"
                UPDATE leases
                SET status = $3, termination_reason = $4, terminated_at = $5, updated_at = NOW()
                WHERE id = $1 AND status = $2
                RETURNING *
                "#,
            )
                .bind(lease_id)
                .bind(expected)
                .bind(status)
                .bind(reason.clone())
                .bind(*terminated_at),

            LeaseChange::Expired { expired_at } => sqlx::query_as::<_, Lease>(
                r#"
                UPDATE leases
                SET status = $3, expired_at = $4, updated_at = NOW()
                WHERE id = $1 AND status = $2
                RETURNING *
                "#,
            )
                .bind(lease_id)
                .bind(expected)
                .bind(status)
                .bind(*expired_at),
        };

        let updated = query.fetch_optional(executor).await?;

        Ok(updated)
    }
}
