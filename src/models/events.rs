// src/models/events.rs

use serde::Serialize;
use uuid::Uuid;

/// Evento de domínio emitido depois que a transição foi gravada.
/// O motor não sabe nada de e-mail; quem consome a fila decide o transporte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LeaseEvent {
    LeaseSent { lease_id: Uuid, tenant_id: Uuid },
    LeaseSigned { lease_id: Uuid, landlord_id: Uuid },
    LeaseApproved { lease_id: Uuid, tenant_id: Uuid },
    LeaseRejected { lease_id: Uuid, tenant_id: Uuid, notes: String },
    RevisionRequested { lease_id: Uuid, tenant_id: Uuid, notes: String },
}

impl LeaseEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            LeaseEvent::LeaseSent { .. } => "lease_sent",
            LeaseEvent::LeaseSigned { .. } => "lease_signed",
            LeaseEvent::LeaseApproved { .. } => "lease_approved",
            LeaseEvent::LeaseRejected { .. } => "lease_rejected",
            LeaseEvent::RevisionRequested { .. } => "revision_requested",
        }
    }

    pub fn lease_id(&self) -> Uuid {
        match self {
            LeaseEvent::LeaseSent { lease_id, .. }
            | LeaseEvent::LeaseSigned { lease_id, .. }
            | LeaseEvent::LeaseApproved { lease_id, .. }
            | LeaseEvent::LeaseRejected { lease_id, .. }
            | LeaseEvent::RevisionRequested { lease_id, .. } => *lease_id,
        }
    }

    pub fn recipient(&self) -> Uuid {
        match self {
            LeaseEvent::LeaseSigned { landlord_id, .. } => *landlord_id,
            LeaseEvent::LeaseSent { tenant_id, .. }
            | LeaseEvent::LeaseApproved { tenant_id, .. }
            | LeaseEvent::LeaseRejected { tenant_id, .. }
            | LeaseEvent::RevisionRequested { tenant_id, .. } => *tenant_id,
        }
    }

    pub fn subject(&self) -> String {
        match self {
            LeaseEvent::LeaseSent { .. } => "Você recebeu um contrato de locação".to_string(),
            LeaseEvent::LeaseSigned { .. } => "O inquilino assinou o contrato".to_string(),
            LeaseEvent::LeaseApproved { .. } => "Seu contrato foi aprovado".to_string(),
            LeaseEvent::LeaseRejected { .. } => "Seu contrato foi rejeitado".to_string(),
            LeaseEvent::RevisionRequested { .. } => "O locador pediu uma revisão".to_string(),
        }
    }

    pub fn body(&self) -> String {
        let lease_id = self.lease_id();
        match self {
            LeaseEvent::LeaseSent { .. } => {
                format!("O contrato {lease_id} está disponível para revisão e assinatura.")
            }
            LeaseEvent::LeaseSigned { .. } => {
                format!("O contrato {lease_id} foi assinado e aguarda sua aprovação.")
            }
            LeaseEvent::LeaseApproved { .. } => {
                format!("O contrato {lease_id} foi aprovado. Bem-vindo ao seu novo lar!")
            }
            LeaseEvent::LeaseRejected { notes, .. } => {
                format!("O contrato {lease_id} foi rejeitado. Observações do locador: {notes}")
            }
            LeaseEvent::RevisionRequested { notes, .. } => {
                format!("O contrato {lease_id} precisa ser assinado novamente. Observações: {notes}")
            }
        }
    }
}
