// src/services/deposit_service.rs

//! Custódia da caução: `pending → held → released | partial_release | forfeited`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
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
        deposit::{Deposit, DepositChange, DepositStatus, NewDeposit},
        lease::Lease,
    },
};

/// Calcula a liquidação de uma devolução. Desconto padrão é zero e precisa
/// caber no valor da caução; com desconto o motivo é obrigatório.
pub fn release_change(
    amount: Decimal,
    deduction: Option<Decimal>,
    reason: Option<&str>,
    settled_at: DateTime<Utc>,
) -> Result<DepositChange, AppError> {
    let deduction = deduction.unwrap_or(Decimal::ZERO);

    if deduction < Decimal::ZERO {
        return Err(AppError::Validation("o desconto não pode ser negativo".into()));
    }
    if deduction > amount {
        return Err(AppError::Validation(format!(
            "o desconto ({deduction}) não pode ser maior que a caução ({amount})"
        )));
    }

    let reason = optional_text(reason);
    if deduction > Decimal::ZERO && reason.is_none() {
        return Err(AppError::Validation("informe o motivo do desconto".into()));
    }

    Ok(DepositChange::Released {
        deduction,
        reason,
        refund: amount - deduction,
        settled_at,
    })
}

#[derive(Clone)]
pub struct DepositService {
    store: Arc<dyn LedgerStore>,
}

impl DepositService {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        actor: Option<&Principal>,
        lease_id: Uuid,
        amount: Option<Decimal>,
    ) -> Result<Deposit, AppError> {
        let lease = self.lease_for(actor, lease_id, Relation::Landlord).await?;

        if lease.status.is_terminal() {
            return Err(AppError::InvalidState(format!(
                "não é possível abrir caução para um contrato encerrado (status atual: {})",
                lease.status
            )));
        }

        if self.store.find_deposit_by_lease(lease.id).await?.is_some() {
            return Err(AppError::AlreadyExists("o contrato já possui uma caução".into()));
        }

        let amount = amount.unwrap_or(lease.deposit_amount);
        if amount <= Decimal::ZERO {
            return Err(AppError::Validation("o valor da caução deve ser maior que zero".into()));
        }

        let deposit = self.store.insert_deposit(NewDeposit { lease_id: lease.id, amount }).await?;
        tracing::info!(deposit_id = %deposit.id, lease_id = %lease.id, "🔐 Caução aberta");

        Ok(deposit)
    }

    pub async fn get_for_lease(&self, actor: Option<&Principal>, lease_id: Uuid) -> Result<Deposit, AppError> {
        let lease = self.lease_for(actor, lease_id, Relation::Participant).await?;

        self.store
            .find_deposit_by_lease(lease.id)
            .await?
            .ok_or(AppError::NotFound("Caução"))
    }

    pub async fn confirm(
        &self,
        actor: Option<&Principal>,
        deposit_id: Uuid,
        method: &str,
        reference: Option<&str>,
    ) -> Result<Deposit, AppError> {
        let deposit = self.deposit_for(actor, deposit_id, Relation::Landlord).await?;
        expect_status(&deposit, DepositStatus::Pending, "confirmar o recebimento")?;

        let change = DepositChange::Confirmed {
            method: required_text(method, "method")?,
            reference: optional_text(reference),
            confirmed_at: Utc::now(),
        };

        self.commit(deposit, change).await
    }

    /// Só registra o pedido; não bloqueia nenhuma ação do locador.
    pub async fn request_release(
        &self,
        actor: Option<&Principal>,
        deposit_id: Uuid,
        note: Option<&str>,
    ) -> Result<Deposit, AppError> {
        let principal = actor.ok_or(AppError::Unauthenticated)?;
        let deposit = self.deposit_for(Some(principal), deposit_id, Relation::Participant).await?;
        expect_status(&deposit, DepositStatus::Held, "solicitar a devolução")?;

        let change = DepositChange::ReleaseRequested {
            requested_by: principal.id,
            requested_at: Utc::now(),
            note: optional_text(note),
        };

        self.commit(deposit, change).await
    }

    pub async fn release(
        &self,
        actor: Option<&Principal>,
        deposit_id: Uuid,
        deduction: Option<Decimal>,
        reason: Option<&str>,
    ) -> Result<Deposit, AppError> {
        let deposit = self.deposit_for(actor, deposit_id, Relation::Landlord).await?;
        expect_status(&deposit, DepositStatus::Held, "devolver a caução")?;

        let change = release_change(deposit.amount, deduction, reason, Utc::now())?;

        self.commit(deposit, change).await
    }

    pub async fn forfeit(&self, actor: Option<&Principal>, deposit_id: Uuid, reason: &str) -> Result<Deposit, AppError> {
        let deposit = self.deposit_for(actor, deposit_id, Relation::Landlord).await?;
        expect_status(&deposit, DepositStatus::Held, "reter a caução")?;

        let change = DepositChange::Forfeited {
            reason: required_text(reason, "reason")?,
            settled_at: Utc::now(),
        };

        self.commit(deposit, change).await
    }

    async fn lease_for(&self, actor: Option<&Principal>, lease_id: Uuid, relation: Relation) -> Result<Lease, AppError> {
        let principal = actor.ok_or(AppError::Unauthenticated)?;

        let lease = self.store
            .get_lease(lease_id)
            .await?
            .ok_or(AppError::NotFound("Contrato"))?;

        can_act(Some(principal), &lease, relation).into_result()?;

        Ok(lease)
    }

    async fn deposit_for(
        &self,
        actor: Option<&Principal>,
        deposit_id: Uuid,
        relation: Relation,
    ) -> Result<Deposit, AppError> {
        let principal = actor.ok_or(AppError::Unauthenticated)?;

        let deposit = self.store
            .get_deposit(deposit_id)
            .await?
            .ok_or(AppError::NotFound("Caução"))?;

        self.lease_for(Some(principal), deposit.lease_id, relation).await?;

        Ok(deposit)
    }

    async fn commit(&self, deposit: Deposit, change: DepositChange) -> Result<Deposit, AppError> {
        let from = deposit.status;
        let updated = self.store.apply_deposit_change(deposit.id, from, change).await?;

        tracing::info!(
            deposit_id = %updated.id,
            lease_id = %updated.lease_id,
            %from,
            to = %updated.status,
            "🔐 Caução atualizada"
        );

        Ok(updated)
    }
}

fn expect_status(deposit: &Deposit, expected: DepositStatus, action: &str) -> Result<(), AppError> {
    if deposit.status.is_settled() {
        return Err(AppError::InvalidState(format!(
            "a caução já foi liquidada; não é possível {action} (status atual: {})",
            deposit.status
        )));
    }
    if deposit.status != expected {
        return Err(AppError::InvalidState(format!(
            "só é possível {action} de uma caução '{expected}' (status atual: {})",
            deposit.status
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(units: i64) -> Decimal {
        Decimal::new(units, 0)
    }

    #[test]
    fn full_refund_without_deduction() {
        let change = release_change(dec(3000), None, None, Utc::now()).unwrap();

        assert_eq!(change.status(), DepositStatus::Released);
        assert!(matches!(change, DepositChange::Released { refund, .. } if refund == dec(3000)));
    }

    #[test]
    fn partial_refund_requires_reason() {
        assert!(matches!(
            release_change(dec(3000), Some(dec(500)), Some("  "), Utc::now()),
            Err(AppError::Validation(_))
        ));

        let change = release_change(dec(3000), Some(dec(500)), Some("pintura"), Utc::now()).unwrap();
        assert_eq!(change.status(), DepositStatus::PartialRelease);
        assert!(matches!(change, DepositChange::Released { refund, .. } if refund == dec(2500)));
    }

    #[test]
    fn deduction_must_fit_the_amount() {
        assert!(release_change(dec(3000), Some(dec(3001)), Some("danos"), Utc::now()).is_err());
        assert!(release_change(dec(3000), Some(dec(-1)), None, Utc::now()).is_err());

        // Desconto total ainda é devolução parcial, com reembolso zero
        let change = release_change(dec(3000), Some(dec(3000)), Some("danos"), Utc::now()).unwrap();
        assert_eq!(change.status(), DepositStatus::PartialRelease);
    }
}
