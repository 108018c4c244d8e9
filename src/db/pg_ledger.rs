// src/db/pg_ledger.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        ledger::{deposit_moved, lease_moved, payment_moved, LedgerStore, TransitionPlan},
        DepositRepository, LeaseRepository, PaymentRepository, PropertyRepository, UserRepository,
    },
    models::{
        deposit::{Deposit, DepositChange, DepositStatus, NewDeposit},
        lease::{Lease, LeaseFilter, NewLease},
        payment::{NewPayment, Payment, PaymentSettlement, PaymentStatus},
        property::{AvailabilityDrift, Property},
    },
};

// Índice único parcial da migração inicial
const ONE_APPROVED_PER_PROPERTY: &str = "uq_leases_one_approved_per_property";

/// Ledger Store sobre Postgres. Cada transição roda numa transação só.
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
    properties: PropertyRepository,
    leases: LeaseRepository,
    payments: PaymentRepository,
    deposits: DepositRepository,
    users: UserRepository,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            properties: PropertyRepository::new(pool.clone()),
            leases: LeaseRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool.clone()),
            deposits: DepositRepository::new(pool.clone()),
            users: UserRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn get_property(&self, id: Uuid) -> Result<Option<Property>, AppError> {
        self.properties.find_by_id(id).await
    }

    async fn set_property_availability(&self, id: Uuid, is_available: bool) -> Result<(), AppError> {
        self.properties.set_availability(&self.pool, id, is_available).await
    }

    async fn find_availability_drift(&self) -> Result<Vec<AvailabilityDrift>, AppError> {
        self.properties.find_availability_drift().await
    }

    async fn insert_lease(&self, lease: NewLease) -> Result<Lease, AppError> {
        self.leases.create_lease(&self.pool, &lease).await
    }

    async fn get_lease(&self, id: Uuid) -> Result<Option<Lease>, AppError> {
        self.leases.find_by_id(id).await
    }

    async fn list_leases(&self, filter: LeaseFilter) -> Result<Vec<Lease>, AppError> {
        self.leases.list(&filter).await
    }

    async fn find_approved_lease(&self, property_id: Uuid) -> Result<Option<Lease>, AppError> {
        self.leases.find_approved_for_property(&self.pool, property_id).await
    }

    async fn list_expirable_leases(&self, today: NaiveDate) -> Result<Vec<Lease>, AppError> {
        self.leases.list_expirable(today).await
    }

    async fn apply_transition(&self, plan: TransitionPlan) -> Result<Lease, AppError> {
        // 1. Inicia a transação; qualquer `?` abaixo faz rollback no drop
        let mut tx = self.pool.begin().await?;

        // 2. Status do contrato primeiro (escrita autoritativa)
        let applied = self.leases
            .apply_change(&mut *tx, plan.lease_id, plan.expected_status, &plan.change)
            .await;

        let lease = match applied {
            // Duas aprovações concorrentes no mesmo imóvel: o índice decide
            Err(AppError::DatabaseError(sqlx::Error::Database(e)))
                if e.constraint() == Some(ONE_APPROVED_PER_PROPERTY) =>
            {
                return Err(AppError::InvalidState(
                    "o imóvel já possui um contrato aprovado".to_string(),
                ));
            }
            other => other?.ok_or_else(|| lease_moved(plan.lease_id, plan.expected_status))?,
        };

        // 3. Disponibilidade do imóvel
        if let Some(property) = plan.property {
            self.properties
                .set_availability(&mut *tx, property.property_id, property.is_available)
                .await?;
        }

        // 4. Cronograma de pagamentos
        for payment in &plan.new_payments {
            self.payments.insert_payment(&mut *tx, payment).await?;
        }

        // 5. Caução (se já existir, o ON CONFLICT mantém a original)
        if let Some(deposit) = &plan.new_deposit {
            self.deposits.insert_deposit(&mut *tx, deposit).await?;
        }

        tx.commit().await?;

        Ok(lease)
    }

    async fn get_payment(&self, id: Uuid) -> Result<Option<Payment>, AppError> {
        self.payments.find_by_id(id).await
    }

    async fn list_payments(&self, lease_id: Uuid) -> Result<Vec<Payment>, AppError> {
        self.payments.list_by_lease(lease_id).await
    }

    async fn insert_payments(&self, payments: Vec<NewPayment>) -> Result<Vec<Payment>, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut inserted = Vec::with_capacity(payments.len());
        for payment in &payments {
            if let Some(created) = self.payments.insert_payment(&mut *tx, payment).await? {
                inserted.push(created);
            }
        }

        tx.commit().await?;

        Ok(inserted)
    }

    async fn settle_payment(
        &self,
        id: Uuid,
        expected: PaymentStatus,
        settlement: PaymentSettlement,
    ) -> Result<Payment, AppError> {
        self.payments
            .settle(&self.pool, id, expected, &settlement)
            .await?
            .ok_or_else(|| payment_moved(id, expected))
    }

    async fn mark_overdue_payments(&self, today: NaiveDate) -> Result<u64, AppError> {
        self.payments.mark_overdue(&self.pool, today).await
    }

    async fn get_deposit(&self, id: Uuid) -> Result<Option<Deposit>, AppError> {
        self.deposits.find_by_id(id).await
    }

    async fn find_deposit_by_lease(&self, lease_id: Uuid) -> Result<Option<Deposit>, AppError> {
        self.deposits.find_by_lease(lease_id).await
    }

    async fn insert_deposit(&self, deposit: NewDeposit) -> Result<Deposit, AppError> {
        self.deposits
            .insert_deposit(&self.pool, &deposit)
            .await?
            .ok_or_else(|| {
                AppError::AlreadyExists(format!("o contrato {} já possui caução", deposit.lease_id))
            })
    }

    async fn apply_deposit_change(
        &self,
        id: Uuid,
        expected: DepositStatus,
        change: DepositChange,
    ) -> Result<Deposit, AppError> {
        self.deposits
            .apply_change(&self.pool, id, expected, &change)
            .await?
            .ok_or_else(|| deposit_moved(id, expected))
    }

    async fn find_user_email(&self, user_id: Uuid) -> Result<Option<String>, AppError> {
        self.users.find_email(user_id).await
    }
}
