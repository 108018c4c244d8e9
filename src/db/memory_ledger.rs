// src/db/memory_ledger.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ledger::{deposit_moved, lease_moved, payment_moved, LedgerStore, TransitionPlan},
    models::{
        deposit::{Deposit, DepositChange, DepositStatus, NewDeposit},
        lease::{Lease, LeaseFilter, LeaseStatus, NewLease},
        payment::{NewPayment, Payment, PaymentSettlement, PaymentStatus},
        property::{AvailabilityDrift, Property},
    },
};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, String>,
    properties: HashMap<Uuid, Property>,
    leases: HashMap<Uuid, Lease>,
    payments: HashMap<Uuid, Payment>,
    deposits: HashMap<Uuid, Deposit>,
}

impl Tables {
    fn has_payment(&self, payment: &NewPayment) -> bool {
        self.payments.values().any(|p| {
            p.lease_id == payment.lease_id && p.due_date == payment.due_date && p.kind == payment.kind
        })
    }

    fn insert_payment(&mut self, payment: &NewPayment) -> Option<Payment> {
        if self.has_payment(payment) {
            return None;
        }

        let created = Payment {
            id: Uuid::new_v4(),
            lease_id: payment.lease_id,
            amount: payment.amount,
            due_date: payment.due_date,
            kind: payment.kind,
            status: PaymentStatus::Pending,
            paid_at: None,
            payment_method: None,
            reference: None,
            created_at: Utc::now(),
        };
        self.payments.insert(created.id, created.clone());
        Some(created)
    }

    fn insert_deposit(&mut self, deposit: &NewDeposit) -> Option<Deposit> {
        if self.deposits.values().any(|d| d.lease_id == deposit.lease_id) {
            return None;
        }

        let now = Utc::now();
        let created = Deposit {
            id: Uuid::new_v4(),
            lease_id: deposit.lease_id,
            amount: deposit.amount,
            status: DepositStatus::Pending,
            deduction_amount: Decimal::ZERO,
            deduction_reason: None,
            refund_amount: None,
            release_requested_at: None,
            release_requested_by: None,
            release_request_note: None,
            payment_method: None,
            payment_reference: None,
            confirmed_at: None,
            settled_at: None,
            created_at: now,
            updated_at: now,
        };
        self.deposits.insert(created.id, created.clone());
        Some(created)
    }

    fn has_approved_lease(&self, property_id: Uuid) -> bool {
        self.leases
            .values()
            .any(|l| l.property_id == property_id && l.status == LeaseStatus::Approved)
    }
}

/// Ledger Store em memória. Um único mutex cobre todas as tabelas, então cada
/// plano de transição é aplicado inteiro ou não é aplicado.
#[derive(Default)]
pub struct MemoryLedgerStore {
    tables: Mutex<Tables>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user_id: Uuid, email: impl Into<String>) {
        self.tables.lock().await.users.insert(user_id, email.into());
    }

    /// Publicação do anúncio (fluxo externo ao núcleo).
    pub async fn insert_property(&self, landlord_id: Uuid, title: &str, is_available: bool) -> Property {
        let now = Utc::now();
        let property = Property {
            id: Uuid::new_v4(),
            landlord_id,
            title: title.to_string(),
            is_available,
            approval_status: "approved".to_string(),
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().await.properties.insert(property.id, property.clone());
        property
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn get_property(&self, id: Uuid) -> Result<Option<Property>, AppError> {
        Ok(self.tables.lock().await.properties.get(&id).cloned())
    }

    async fn set_property_availability(&self, id: Uuid, is_available: bool) -> Result<(), AppError> {
        let mut tables = self.tables.lock().await;
        let property = tables.properties.get_mut(&id).ok_or(AppError::NotFound("Imóvel"))?;
        property.is_available = is_available;
        property.updated_at = Utc::now();
        Ok(())
    }

    async fn find_availability_drift(&self) -> Result<Vec<AvailabilityDrift>, AppError> {
        let tables = self.tables.lock().await;

        let drift = tables
            .properties
            .values()
            .filter_map(|property| {
                let approved = tables.has_approved_lease(property.id);
                if property.is_available && approved {
                    return Some(AvailabilityDrift { property_id: property.id, expected_available: false });
                }

                let recently_closed = tables.leases.values().any(|l| {
                    l.property_id == property.id
                        && matches!(l.status, LeaseStatus::Terminated | LeaseStatus::Expired)
                        && l.approved_at.is_some()
                        && l.updated_at > property.updated_at
                });
                if !property.is_available && !approved && recently_closed {
                    return Some(AvailabilityDrift { property_id: property.id, expected_available: true });
                }

                None
            })
            .collect();

        Ok(drift)
    }

    async fn insert_lease(&self, lease: NewLease) -> Result<Lease, AppError> {
        let now = Utc::now();
        let created = Lease {
            id: Uuid::new_v4(),
            property_id: lease.property_id,
            tenant_id: lease.tenant_id,
            landlord_id: lease.landlord_id,
            start_date: lease.start_date,
            end_date: lease.end_date,
            monthly_rent: lease.monthly_rent,
            deposit_amount: lease.deposit_amount,
            document_content: lease.document_content,
            tenant_signature_data: None,
            landlord_signature_data: None,
            tenant_documents: Vec::new(),
            status: LeaseStatus::Draft,
            sent_at: None,
            signed_at: None,
            approved_at: None,
            terminated_at: None,
            expired_at: None,
            termination_reason: None,
            landlord_notes: None,
            created_at: now,
            updated_at: now,
        };

        self.tables.lock().await.leases.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_lease(&self, id: Uuid) -> Result<Option<Lease>, AppError> {
        Ok(self.tables.lock().await.leases.get(&id).cloned())
    }

    async fn list_leases(&self, filter: LeaseFilter) -> Result<Vec<Lease>, AppError> {
        let tables = self.tables.lock().await;
        let mut leases: Vec<Lease> = tables.leases.values().filter(|l| filter.matches(l)).cloned().collect();
        leases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(leases)
    }

    async fn find_approved_lease(&self, property_id: Uuid) -> Result<Option<Lease>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .leases
            .values()
            .find(|l| l.property_id == property_id && l.status == LeaseStatus::Approved)
            .cloned())
    }

    async fn list_expirable_leases(&self, today: NaiveDate) -> Result<Vec<Lease>, AppError> {
        let tables = self.tables.lock().await;
        let mut leases: Vec<Lease> = tables
            .leases
            .values()
            .filter(|l| l.status == LeaseStatus::Approved && l.end_date < today)
            .cloned()
            .collect();
        leases.sort_by_key(|l| l.end_date);
        Ok(leases)
    }

    async fn apply_transition(&self, plan: TransitionPlan) -> Result<Lease, AppError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();

        // Valida tudo antes de mexer em qualquer tabela
        let current = tables.leases.get(&plan.lease_id).ok_or(AppError::NotFound("Contrato"))?;
        if current.status != plan.expected_status {
            return Err(lease_moved(plan.lease_id, plan.expected_status));
        }
        if let Some(change) = plan.property {
            if !tables.properties.contains_key(&change.property_id) {
                return Err(AppError::NotFound("Imóvel"));
            }
        }
        // Mesma regra do índice único parcial do Postgres
        if plan.change.status() == LeaseStatus::Approved && tables.has_approved_lease(current.property_id) {
            return Err(AppError::InvalidState("o imóvel já possui um contrato aprovado".to_string()));
        }

        let mut lease = current.clone();
        plan.change.apply_to(&mut lease, now);
        tables.leases.insert(lease.id, lease.clone());

        if let Some(change) = plan.property {
            if let Some(property) = tables.properties.get_mut(&change.property_id) {
                property.is_available = change.is_available;
                property.updated_at = now;
            }
        }

        for payment in &plan.new_payments {
            tables.insert_payment(payment);
        }

        if let Some(deposit) = &plan.new_deposit {
            tables.insert_deposit(deposit);
        }

        Ok(lease)
    }

    async fn get_payment(&self, id: Uuid) -> Result<Option<Payment>, AppError> {
        Ok(self.tables.lock().await.payments.get(&id).cloned())
    }

    async fn list_payments(&self, lease_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let tables = self.tables.lock().await;
        let mut payments: Vec<Payment> =
            tables.payments.values().filter(|p| p.lease_id == lease_id).cloned().collect();
        payments.sort_by_key(|p| p.due_date);
        Ok(payments)
    }

    async fn insert_payments(&self, payments: Vec<NewPayment>) -> Result<Vec<Payment>, AppError> {
        let mut tables = self.tables.lock().await;
        Ok(payments.iter().filter_map(|p| tables.insert_payment(p)).collect())
    }

    async fn settle_payment(
        &self,
        id: Uuid,
        expected: PaymentStatus,
        settlement: PaymentSettlement,
    ) -> Result<Payment, AppError> {
        let mut tables = self.tables.lock().await;
        let payment = tables.payments.get_mut(&id).ok_or(AppError::NotFound("Pagamento"))?;
        if payment.status != expected {
            return Err(payment_moved(id, expected));
        }

        payment.status = PaymentStatus::Paid;
        payment.paid_at = Some(settlement.paid_at);
        payment.payment_method = Some(settlement.method);
        payment.reference = settlement.reference;
        Ok(payment.clone())
    }

    async fn mark_overdue_payments(&self, today: NaiveDate) -> Result<u64, AppError> {
        let mut tables = self.tables.lock().await;
        let mut count = 0;
        for payment in tables.payments.values_mut() {
            if payment.status == PaymentStatus::Pending && payment.due_date < today {
                payment.status = PaymentStatus::Overdue;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn get_deposit(&self, id: Uuid) -> Result<Option<Deposit>, AppError> {
        Ok(self.tables.lock().await.deposits.get(&id).cloned())
    }

    async fn find_deposit_by_lease(&self, lease_id: Uuid) -> Result<Option<Deposit>, AppError> {
        let tables = self.tables.lock().await;
        Ok(tables.deposits.values().find(|d| d.lease_id == lease_id).cloned())
    }

    async fn insert_deposit(&self, deposit: NewDeposit) -> Result<Deposit, AppError> {
        let mut tables = self.tables.lock().await;
        tables.insert_deposit(&deposit).ok_or_else(|| {
            AppError::AlreadyExists(format!("o contrato {} já possui caução", deposit.lease_id))
        })
    }

    async fn apply_deposit_change(
        &self,
        id: Uuid,
        expected: DepositStatus,
        change: DepositChange,
    ) -> Result<Deposit, AppError> {
        let mut tables = self.tables.lock().await;
        let deposit = tables.deposits.get_mut(&id).ok_or(AppError::NotFound("Caução"))?;
        if deposit.status != expected {
            return Err(deposit_moved(id, expected));
        }

        change.apply_to(deposit, Utc::now());
        Ok(deposit.clone())
    }

    async fn find_user_email(&self, user_id: Uuid) -> Result<Option<String>, AppError> {
        Ok(self.tables.lock().await.users.get(&user_id).cloned())
    }
}
