// src/models/property.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    pub landlord_id: Uuid,

    #[schema(example = "Apartamento 2 quartos - Centro")]
    pub title: String,

    // Só o motor de contratos mexe nisso depois da publicação
    #[schema(example = true)]
    pub is_available: bool,

    // Fluxo de aprovação do anúncio (fora do núcleo)
    #[schema(example = "approved")]
    pub approval_status: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Divergência entre a disponibilidade gravada e a que os contratos exigem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityDrift {
    pub property_id: Uuid,
    pub expected_available: bool,
}
