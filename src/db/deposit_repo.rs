// src/db/deposit_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::deposit::{Deposit, DepositChange, DepositStatus, NewDeposit},
};

#[derive(Clone)]
pub struct DepositRepository {
    pool: PgPool,
}

impl DepositRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `None` quando o contrato já tem caução.
    pub async fn insert_deposit<'e, E>(
        &self,
        executor: E,
        deposit: &NewDeposit,
    ) -> Result<Option<Deposit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let inserted = sqlx::query_as::<_, Deposit>(
            r#"
            INSERT INTO deposits (lease_id, amount)
            VALUES ($1, $2)
            ON CONFLICT (lease_id) DO NOTHING
            RETURNING *
            "#,
        )
            .bind(deposit.lease_id)
            .bind(deposit.amount)
            .fetch_optional(executor)
            .await?;

        Ok(inserted)
    }

    pub async fn find_by_id(&self, deposit_id: Uuid) -> Result<Option<Deposit>, AppError> {
        let deposit = sqlx::query_as::<_, Deposit>("SELECT * FROM deposits WHERE id = $1")
            .bind(deposit_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(deposit)
    }

    pub async fn find_by_lease(&self, lease_id: Uuid) -> Result<Option<Deposit>, AppError> {
        let deposit = sqlx::query_as::<_, Deposit>("SELECT * FROM deposits WHERE lease_id = $1")
            .bind(lease_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(deposit)
    }

    // Mesma ideia do contrato: condicionado ao status lido.
    pub async fn apply_change<'e, E>(
        &self,
        executor: E,
        deposit_id: Uuid,
        expected: DepositStatus,
        change: &DepositChange,
    ) -> Result<Option<Deposit>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let status = change.status();

        let query = match change {
            DepositChange::Confirmed { method, reference, confirmed_at } => {
                sqlx::query_as::<_, Deposit>(
                    r#"
                    UPDATE deposits
                    SET status = $3, payment_method = $4, payment_reference = $5,
                        confirmed_at = $6, updated_at = NOW()
                    WHERE id = $1 AND status = $2
                    RETURNING *
                    "#,
                )
                    .bind(deposit_id)
                    .bind(expected)
                    .bind(status)
                    .bind(method.clone())
                    .bind(reference.clone())
                    .bind(*confirmed_at)
            }

            DepositChange::ReleaseRequested { requested_by, requested_at, note } => {
                sqlx::query_as::<_, Deposit>(
                    r#"
                    UPDATE deposits
                    SET status = $3, release_requested_by = $4, release_requested_at = $5,
                        release_request_note = $6, updated_at = NOW()
                    WHERE id = $1 AND status = $2
                    RETURNING *
                    "#,
                )
                    .bind(deposit_id)
                    .bind(expected)
                    .bind(status)
                    .bind(*requested_by)
                    .bind(*requested_at)
                    .bind(note.clone())
            }

            DepositChange::Released { deduction, reason, refund, settled_at } => {
                sqlx::query_as::<_, Deposit>(
                    r#"
                    UPDATE deposits
                    SET status = $3, deduction_amount = $4, deduction_reason = $5,
                        refund_amount = $6, settled_at = $7, updated_at = NOW()
                    WHERE id = $1 AND status = $2
                    RETURNING *
                    "#,
                )
                    .bind(deposit_id)
                    .bind(expected)
                    .bind(status)
                    .bind(*deduction)
                    .bind(reason.clone())
                    .bind(*refund)
                    .bind(*settled_at)
            }

            DepositChange::Forfeited { reason, settled_at } => sqlx::query_as::<_, Deposit>(
                r#"
                UPDATE deposits
                SET status = $3, deduction_amount = amount, deduction_reason = $4,
                    refund_amount = 0, settled_at = $5, updated_at = NOW()
                WHERE id = $1 AND status = $2
                RETURNING *
                "#,
            )
                .bind(deposit_id)
                .bind(expected)
                .bind(status)
                .bind(reason.clone())
                .bind(*settled_at),
        };

        let updated = query.fetch_optional(executor).await?;

        Ok(updated)
    }
}
