// src/services/payment_service.rs

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    common::{
        authz::{can_act, Relation},
        error::AppError,
        validation::{optional_text, required_text},
    },
    db::LedgerStore,
    models::{
        auth::Principal,
        lease::{Lease, LeaseStatus},
        payment::{Payment, PaymentSettlement, PaymentStatus},
    },
    services::payment_scheduler::{plan_rent_schedule, BillingTerms, SchedulePolicy},
};

pub const MAX_HORIZON_MONTHS: u32 = 120;

#[derive(Clone)]
pub struct PaymentService {
    store: Arc<dyn LedgerStore>,
    policy: SchedulePolicy,
}

impl PaymentService {
    pub fn new(store: Arc<dyn LedgerStore>, policy: SchedulePolicy) -> Self {
        Self { store, policy }
    }

    /// Gera os vencimentos que faltam no horizonte pedido. Chamadas repetidas
    /// não duplicam nada; o retorno contém apenas o que foi criado agora.
    pub async fn generate_schedule(
        &self,
        actor: Option<&Principal>,
        lease_id: Uuid,
        horizon_months: Option<u32>,
    ) -> Result<Vec<Payment>, AppError> {
        let lease = self.lease_for(actor, lease_id, Relation::Landlord).await?;

        if lease.status != LeaseStatus::Approved {
            return Err(AppError::InvalidState(format!(
                "o cronograma só pode ser gerado para contratos aprovados (status atual: {})",
                lease.status
            )));
        }

        let horizon = horizon_months.unwrap_or(self.policy.horizon_months);
        if !(1..=MAX_HORIZON_MONTHS).contains(&horizon) {
            return Err(AppError::Validation(format!(
                "o horizonte deve estar entre 1 e {MAX_HORIZON_MONTHS} meses"
            )));
        }

        let existing: HashSet<NaiveDate> = self.store
            .list_payments(lease.id)
            .await?
            .into_iter()
            .map(|p| p.due_date)
            .collect();

        let policy = SchedulePolicy::new(self.policy.due_day, horizon);
        let planned = plan_rent_schedule(&BillingTerms::from(&lease), &existing, policy);

        if planned.is_empty() {
            return Ok(Vec::new());
        }

        let created = self.store.insert_payments(planned).await?;
        tracing::info!(lease_id = %lease.id, created = created.len(), "📅 Cronograma de aluguel gerado");

        Ok(created)
    }

    pub async fn list_payments(&self, actor: Option<&Principal>, lease_id: Uuid) -> Result<Vec<Payment>, AppError> {
        let lease = self.lease_for(actor, lease_id, Relation::Participant).await?;
        self.store.list_payments(lease.id).await
    }

    pub async fn mark_paid(
        &self,
        actor: Option<&Principal>,
        payment_id: Uuid,
        method: &str,
        reference: Option<&str>,
    ) -> Result<Payment, AppError> {
        let principal = actor.ok_or(AppError::Unauthenticated)?;

        let payment = self.store
            .get_payment(payment_id)
            .await?
            .ok_or(AppError::NotFound("Pagamento"))?;

        self.lease_for(Some(principal), payment.lease_id, Relation::Landlord).await?;

        if payment.status == PaymentStatus::Paid {
            return Err(AppError::InvalidState("o pagamento já foi quitado".into()));
        }

        let settlement = PaymentSettlement {
            paid_at: Utc::now(),
            method: required_text(method, "method")?,
            reference: optional_text(reference),
        };

        let paid = self.store.settle_payment(payment.id, payment.status, settlement).await?;
        tracing::info!(payment_id = %paid.id, lease_id = %paid.lease_id, "💰 Pagamento quitado");

        Ok(paid)
    }

    /// Varredura: `pending` vencidos viram `overdue`. Idempotente.
    pub async fn mark_overdue(&self, today: NaiveDate) -> Result<u64, AppError> {
        let updated = self.store.mark_overdue_payments(today).await?;
        if updated > 0 {
            tracing::info!(updated, %today, "⏰ Pagamentos marcados como em atraso");
        }
        Ok(updated)
    }

    async fn lease_for(
        &self,
        actor: Option<&Principal>,
        lease_id: Uuid,
        relation: Relation,
    ) -> Result<Lease, AppError> {
        let principal = actor.ok_or(AppError::Unauthenticated)?;

        let lease = self.store
            .get_lease(lease_id)
            .await?
            .ok_or(AppError::NotFound("Contrato"))?;

        can_act(Some(principal), &lease, relation).into_result()?;

        Ok(lease)
    }
}
