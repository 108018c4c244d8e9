// src/db/payment_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::payment::{NewPayment, Payment, PaymentSettlement, PaymentStatus},
};

#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ON CONFLICT é a segunda barreira contra vencimentos duplicados;
    // a primeira é o próprio agendador.
    pub async fn insert_payment<'e, E>(
        &self,
        executor: E,
        payment: &NewPayment,
    ) -> Result<Option<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let inserted = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (lease_id, amount, due_date, kind)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (lease_id, due_date, kind) DO NOTHING
            RETURNING *
            "#,
        )
            .bind(payment.lease_id)
            .bind(payment.amount)
            .bind(payment.due_date)
            .bind(payment.kind)
            .fetch_optional(executor)
            .await?;

        Ok(inserted)
    }

    pub async fn find_by_id(&self, payment_id: Uuid) -> Result<Option<Payment>, AppError> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(payment_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(payment)
    }

    pub async fn list_by_lease(&self, lease_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE lease_id = $1 ORDER BY due_date ASC",
        )
            .bind(lease_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(payments)
    }

    pub async fn settle<'e, E>(
        &self,
        executor: E,
        payment_id: Uuid,
        expected: PaymentStatus,
        settlement: &PaymentSettlement,
    ) -> Result<Option<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET status = 'paid', paid_at = $3, payment_method = $4, reference = $5
            WHERE id = $1 AND status = $2
            RETURNING *
            "#,
        )
            .bind(payment_id)
            .bind(expected)
            .bind(settlement.paid_at)
            .bind(&settlement.method)
            .bind(&settlement.reference)
            .fetch_optional(executor)
            .await?;

        Ok(payment)
    }

    pub async fn mark_overdue<'e, E>(&self, executor: E, today: NaiveDate) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE payments SET status = 'overdue' WHERE status = 'pending' AND due_date < $1",
        )
            .bind(today)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
