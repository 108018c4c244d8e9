// src/models/deposit.rs

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "deposit_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    Pending,        // Aguardando confirmação do locador
    Held,           // Em custódia
    PartialRelease, // Devolvido com desconto
    Released,       // Devolvido integralmente
    Forfeited,      // Retido
}

impl DepositStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DepositStatus::Pending => "pending",
            DepositStatus::Held => "held",
            DepositStatus::PartialRelease => "partial_release",
            DepositStatus::Released => "released",
            DepositStatus::Forfeited => "forfeited",
        }
    }

    pub fn is_settled(self) -> bool {
        matches!(
            self,
            DepositStatus::PartialRelease | DepositStatus::Released | DepositStatus::Forfeited
        )
    }
}

impl fmt::Display for DepositStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Deposit {
    pub id: Uuid,
    pub lease_id: Uuid,

    #[schema(example = "3000.00")]
    pub amount: Decimal,
    pub status: DepositStatus,

    // Liquidação
    #[schema(example = "250.00")]
    pub deduction_amount: Decimal,
    pub deduction_reason: Option<String>,
    pub refund_amount: Option<Decimal>,

    // Pedido de devolução (só metadados)
    pub release_requested_at: Option<DateTime<Utc>>,
    pub release_requested_by: Option<Uuid>,
    pub release_request_note: Option<String>,

    // Confirmação do recebimento
    #[schema(example = "bank_transfer")]
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,

    pub settled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDeposit {
    pub lease_id: Uuid,
    pub amount: Decimal,
}

/// Efeito tipado de cada passo da custódia.
#[derive(Debug, Clone, PartialEq)]
pub enum DepositChange {
    Confirmed {
        method: String,
        reference: Option<String>,
        confirmed_at: DateTime<Utc>,
    },
    ReleaseRequested {
        requested_by: Uuid,
        requested_at: DateTime<Utc>,
        note: Option<String>,
    },
    Released {
        deduction: Decimal,
        reason: Option<String>,
        refund: Decimal,
        settled_at: DateTime<Utc>,
    },
    Forfeited {
        reason: String,
        settled_at: DateTime<Utc>,
    },
}

impl DepositChange {
    pub fn status(&self) -> DepositStatus {
        match self {
            DepositChange::Confirmed { .. } | DepositChange::ReleaseRequested { .. } => {
                DepositStatus::Held
            }
            DepositChange::Released { deduction, .. } if deduction.is_zero() => {
                DepositStatus::Released
            }
            DepositChange::Released { .. } => DepositStatus::PartialRelease,
            DepositChange::Forfeited { .. } => DepositStatus::Forfeited,
        }
    }

    pub fn apply_to(&self, deposit: &mut Deposit, now: DateTime<Utc>) {
        deposit.status = self.status();
        deposit.updated_at = now;

        match self {
            DepositChange::Confirmed { method, reference, confirmed_at } => {
                deposit.payment_method = Some(method.clone());
                deposit.payment_reference = reference.clone();
                deposit.confirmed_at = Some(*confirmed_at);
            }
            DepositChange::ReleaseRequested { requested_by, requested_at, note } => {
                deposit.release_requested_by = Some(*requested_by);
                deposit.release_requested_at = Some(*requested_at);
                deposit.release_request_note = note.clone();
            }
            DepositChange::Released { deduction, reason, refund, settled_at } => {
                deposit.deduction_amount = *deduction;
                deposit.deduction_reason = reason.clone();
                deposit.refund_amount = Some(*refund);
                deposit.settled_at = Some(*settled_at);
            }
            DepositChange::Forfeited { reason, settled_at } => {
                deposit.deduction_amount = deposit.amount;
                deposit.deduction_reason = Some(reason.clone());
                deposit.refund_amount = Some(Decimal::ZERO);
                deposit.settled_at = Some(*settled_at);
            }
        }
    }
}
