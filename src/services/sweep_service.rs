// src/services/sweep_service.rs

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tokio::task::JoinHandle;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    db::LedgerStore,
    services::{lease_service::LeaseService, payment_service::PaymentService},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SweepReport {
    pub expired_leases: u64,
    pub overdue_payments: u64,
    pub availability_fixes: u64,
}

/// Varreduras diárias: expiração, atraso e reconciliação de disponibilidade.
#[derive(Clone)]
pub struct SweepService {
    store: Arc<dyn LedgerStore>,
    leases: LeaseService,
    payments: PaymentService,
}

impl SweepService {
    pub fn new(store: Arc<dyn LedgerStore>, leases: LeaseService, payments: PaymentService) -> Self {
        Self { store, leases, payments }
    }

    /// Contratos aprovados com término anterior a `today` viram `expired`.
    /// Um contrato que outra requisição já moveu é apenas ignorado.
    pub async fn expire_stale_leases(&self, today: NaiveDate) -> Result<u64, AppError> {
        let candidates = self.store.list_expirable_leases(today).await?;
        let mut expired = 0;

        for lease in &candidates {
            match self.leases.expire(lease, today).await {
                Ok(_) => expired += 1,
                Err(AppError::InvalidState(reason)) => {
                    tracing::debug!(lease_id = %lease.id, %reason, "Contrato mudou durante a varredura; ignorado");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(expired)
    }

    pub async fn reconcile_availability(&self) -> Result<u64, AppError> {
        let drift = self.store.find_availability_drift().await?;

        for fix in &drift {
            self.store
                .set_property_availability(fix.property_id, fix.expected_available)
                .await?;
            tracing::warn!(
                property_id = %fix.property_id,
                is_available = fix.expected_available,
                "Disponibilidade do imóvel corrigida pela reconciliação"
            );
        }

        Ok(drift.len() as u64)
    }

    pub async fn run_all(&self, today: NaiveDate) -> Result<SweepReport, AppError> {
        let report = SweepReport {
            expired_leases: self.expire_stale_leases(today).await?,
            overdue_payments: self.payments.mark_overdue(today).await?,
            availability_fixes: self.reconcile_availability().await?,
        };

        tracing::info!(
            %today,
            expired = report.expired_leases,
            overdue = report.overdue_payments,
            fixes = report.availability_fixes,
            "🧹 Varredura concluída"
        );

        Ok(report)
    }

    /// Dispara `run_all` no intervalo dado; o primeiro tick é imediato.
    pub fn spawn_periodic(self, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if let Err(e) = self.run_all(Utc::now().date_naive()).await {
                    tracing::error!("❌ Falha na varredura periódica: {:?}", e);
                }
            }
        })
    }
}
