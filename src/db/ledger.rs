// src/db/ledger.rs

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        deposit::{Deposit, DepositChange, DepositStatus, NewDeposit},
        lease::{Lease, LeaseChange, LeaseFilter, LeaseStatus, NewLease},
        payment::{NewPayment, Payment, PaymentSettlement, PaymentStatus},
        property::{AvailabilityDrift, Property},
    },
};

/// Mudança de disponibilidade que acompanha uma transição.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyChange {
    pub property_id: Uuid,
    pub is_available: bool,
}

/// Tudo que uma transição grava. O store aplica o plano como uma unidade:
/// primeiro o status do contrato (condicionado a `expected_status`), depois
/// os efeitos colaterais. Se o status mudou no meio do caminho nada é gravado.
#[derive(Debug, Clone)]
pub struct TransitionPlan {
    pub lease_id: Uuid,
    pub expected_status: LeaseStatus,
    pub change: LeaseChange,
    pub property: Option<PropertyChange>,
    pub new_payments: Vec<NewPayment>,
    pub new_deposit: Option<NewDeposit>,
}

impl TransitionPlan {
    pub fn new(lease: &Lease, change: LeaseChange) -> Self {
        Self {
            lease_id: lease.id,
            expected_status: lease.status,
            change,
            property: None,
            new_payments: Vec::new(),
            new_deposit: None,
        }
    }

    pub fn with_property(mut self, property_id: Uuid, is_available: bool) -> Self {
        self.property = Some(PropertyChange { property_id, is_available });
        self
    }

    pub fn with_payments(mut self, payments: Vec<NewPayment>) -> Self {
        self.new_payments = payments;
        self
    }

    pub fn with_deposit(mut self, deposit: Option<NewDeposit>) -> Self {
        self.new_deposit = deposit;
        self
    }
}

pub(crate) fn lease_moved(lease_id: Uuid, expected: LeaseStatus) -> AppError {
    AppError::InvalidState(format!(
        "o contrato {lease_id} saiu do status '{expected}' durante a operação"
    ))
}

pub(crate) fn deposit_moved(deposit_id: Uuid, expected: DepositStatus) -> AppError {
    AppError::InvalidState(format!(
        "a caução {deposit_id} saiu do status '{expected}' durante a operação"
    ))
}

pub(crate) fn payment_moved(payment_id: Uuid, expected: PaymentStatus) -> AppError {
    AppError::InvalidState(format!(
        "o pagamento {payment_id} saiu do status '{expected}' durante a operação"
    ))
}

/// Ledger Store: único recurso mutável compartilhado do núcleo.
///
/// Leituras e escritas de um registro são atômicas; `apply_transition`
/// aplica contrato + imóvel + pagamentos + caução juntos.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // --- Imóveis ---
    async fn get_property(&self, id: Uuid) -> Result<Option<Property>, AppError>;
    async fn set_property_availability(&self, id: Uuid, is_available: bool) -> Result<(), AppError>;
    async fn find_availability_drift(&self) -> Result<Vec<AvailabilityDrift>, AppError>;

    // --- Contratos ---
    async fn insert_lease(&self, lease: NewLease) -> Result<Lease, AppError>;
    async fn get_lease(&self, id: Uuid) -> Result<Option<Lease>, AppError>;
    async fn list_leases(&self, filter: LeaseFilter) -> Result<Vec<Lease>, AppError>;
    async fn find_approved_lease(&self, property_id: Uuid) -> Result<Option<Lease>, AppError>;
    /// Contratos `approved` com `end_date < today`.
    async fn list_expirable_leases(&self, today: NaiveDate) -> Result<Vec<Lease>, AppError>;
    async fn apply_transition(&self, plan: TransitionPlan) -> Result<Lease, AppError>;

    // --- Pagamentos ---
    async fn get_payment(&self, id: Uuid) -> Result<Option<Payment>, AppError>;
    async fn list_payments(&self, lease_id: Uuid) -> Result<Vec<Payment>, AppError>;
    /// Ignora silenciosamente vencimentos que já existem para o contrato.
    async fn insert_payments(&self, payments: Vec<NewPayment>) -> Result<Vec<Payment>, AppError>;
    async fn settle_payment(
        &self,
        id: Uuid,
        expected: PaymentStatus,
        settlement: PaymentSettlement,
    ) -> Result<Payment, AppError>;
    /// `pending` com vencimento anterior a `today` viram `overdue`.
    async fn mark_overdue_payments(&self, today: NaiveDate) -> Result<u64, AppError>;

    // --- Cauções ---
    async fn get_deposit(&self, id: Uuid) -> Result<Option<Deposit>, AppError>;
    async fn find_deposit_by_lease(&self, lease_id: Uuid) -> Result<Option<Deposit>, AppError>;
    /// `AlreadyExists` se o contrato já tem caução.
    async fn insert_deposit(&self, deposit: NewDeposit) -> Result<Deposit, AppError>;
    async fn apply_deposit_change(
        &self,
        id: Uuid,
        expected: DepositStatus,
        change: DepositChange,
    ) -> Result<Deposit, AppError>;

    // --- Usuários (endereço para notificações) ---
    async fn find_user_email(&self, user_id: Uuid) -> Result<Option<String>, AppError>;
}
