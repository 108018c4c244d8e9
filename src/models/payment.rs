// src/models/payment.rs

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending, // Em aberto
    Paid,    // Quitado
    Overdue, // Vencido
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overdue => "overdue",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    Rent,
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub lease_id: Uuid,

    #[schema(example = "1500.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2026-02-01")]
    pub due_date: NaiveDate,

    pub kind: PaymentKind,
    pub status: PaymentStatus,

    pub paid_at: Option<DateTime<Utc>>,
    #[schema(example = "pix")]
    pub payment_method: Option<String>,
    pub reference: Option<String>,

    pub created_at: DateTime<Utc>,
}

/// Obrigação gerada pelo agendador, ainda não gravada.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub lease_id: Uuid,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub kind: PaymentKind,
}

/// Dados da baixa de um pagamento.
#[derive(Debug, Clone)]
pub struct PaymentSettlement {
    pub paid_at: DateTime<Utc>,
    pub method: String,
    pub reference: Option<String>,
}
