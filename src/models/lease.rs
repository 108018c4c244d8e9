// src/models/lease.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "lease_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeaseStatus {
    Draft,
    SentToTenant,
    TenantSigned,
    RevisionRequested,
    Approved,
    Rejected,
    Terminated,
    Expired,
}

impl LeaseStatus {
    pub const ALL: [LeaseStatus; 8] = [
        LeaseStatus::Draft,
        LeaseStatus::SentToTenant,
        LeaseStatus::TenantSigned,
        LeaseStatus::RevisionRequested,
        LeaseStatus::Approved,
        LeaseStatus::Rejected,
        LeaseStatus::Terminated,
        LeaseStatus::Expired,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LeaseStatus::Draft => "draft",
            LeaseStatus::SentToTenant => "sent_to_tenant",
            LeaseStatus::TenantSigned => "tenant_signed",
            LeaseStatus::RevisionRequested => "revision_requested",
            LeaseStatus::Approved => "approved",
            LeaseStatus::Rejected => "rejected",
            LeaseStatus::Terminated => "terminated",
            LeaseStatus::Expired => "expired",
        }
    }

    /// Estados de auditoria: o contrato nunca mais se move a partir deles.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            LeaseStatus::Rejected | LeaseStatus::Terminated | LeaseStatus::Expired
        )
    }
}

impl fmt::Display for LeaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Eventos que movem um contrato. A tabela de transições inteira mora em
/// [`LeaseAction::target`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeaseAction {
    Send,
    Sign,
    Approve,
    Reject,
    RequestRevision,
    Terminate,
    Expire,
}

impl LeaseAction {
    pub const ALL: [LeaseAction; 7] = [
        LeaseAction::Send,
        LeaseAction::Sign,
        LeaseAction::Approve,
        LeaseAction::Reject,
        LeaseAction::RequestRevision,
        LeaseAction::Terminate,
        LeaseAction::Expire,
    ];

    /// Status de destino, ou `InvalidState` nomeando a pré-condição violada.
    pub fn target(self, from: LeaseStatus) -> Result<LeaseStatus, AppError> {
        use LeaseStatus::*;

        let to = match (self, from) {
            (Self::Send, Draft) => SentToTenant,
            (Self::Sign, SentToTenant | RevisionRequested) => TenantSigned,
            (Self::Approve, TenantSigned) => Approved,
            (Self::Reject, TenantSigned) => Rejected,
            (Self::RequestRevision, TenantSigned) => RevisionRequested,
            (Self::Terminate, status) if !status.is_terminal() => Terminated,
            (Self::Expire, Approved) => Expired,
            (action, status) => {
                return Err(AppError::InvalidState(action.precondition_failure(status)));
            }
        };

        Ok(to)
    }

    fn precondition_failure(self, status: LeaseStatus) -> String {
        let requirement = match self {
            Self::Send => "só é possível enviar ao inquilino um contrato em rascunho",
            Self::Sign => "o contrato não está pronto para assinatura",
            Self::Approve => "o contrato precisa estar assinado pelo inquilino para ser aprovado",
            Self::Reject => "só é possível rejeitar um contrato assinado pelo inquilino",
            Self::RequestRevision => {
                "só é possível pedir revisão de um contrato assinado pelo inquilino"
            }
            Self::Terminate => "o contrato já está encerrado",
            Self::Expire => "só contratos aprovados podem expirar",
        };
        format!("{requirement} (status atual: {status})")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    IdFront,
    IdBack,
    ProofOfIncome,
    BankStatement,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::IdFront => "id_front",
            DocumentKind::IdBack => "id_back",
            DocumentKind::ProofOfIncome => "proof_of_income",
            DocumentKind::BankStatement => "bank_statement",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "id_front" => Ok(DocumentKind::IdFront),
            "id_back" => Ok(DocumentKind::IdBack),
            "proof_of_income" => Ok(DocumentKind::ProofOfIncome),
            "bank_statement" => Ok(DocumentKind::BankStatement),
            other => Err(format!("tipo de documento desconhecido: {other}")),
        }
    }
}

// --- Structs ---

/// Documento do inquilino já validado pelo armazenamento de arquivos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantDocument {
    pub kind: DocumentKind,
    #[schema(example = "tenants/3f2a/id_front.jpg")]
    pub file_ref: String,
    #[schema(example = "https://files.example.com/tenants/3f2a/id_front.jpg")]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lease {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub landlord_id: Uuid,

    // Datas
    #[schema(value_type = String, format = Date, example = "2026-01-15")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2027-01-14")]
    pub end_date: NaiveDate,

    // Valores
    #[schema(example = "1500.00")]
    pub monthly_rent: Decimal,
    #[schema(example = "3000.00")]
    pub deposit_amount: Decimal,

    // Cláusulas e políticas capturadas na autoria
    #[schema(value_type = Object, example = json!({"clauses": ["Proibido fumar"]}))]
    pub document_content: serde_json::Value,

    // Assinaturas (blobs opacos)
    pub tenant_signature_data: Option<String>,
    pub landlord_signature_data: Option<String>,

    #[sqlx(json)]
    pub tenant_documents: Vec<TenantDocument>,

    pub status: LeaseStatus,

    pub sent_at: Option<DateTime<Utc>>,
    pub signed_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub terminated_at: Option<DateTime<Utc>>,
    pub expired_at: Option<DateTime<Utc>>,

    pub termination_reason: Option<String>,
    pub landlord_notes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Lease {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.tenant_id == user_id || self.landlord_id == user_id
    }
}

/// Dados de criação. O contrato sempre nasce em `draft`.
#[derive(Debug, Clone)]
pub struct NewLease {
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub landlord_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_rent: Decimal,
    pub deposit_amount: Decimal,
    pub document_content: serde_json::Value,
}

/// Efeito tipado de cada transição sobre o contrato. Cada variante grava
/// exatamente os campos daquela transição.
#[derive(Debug, Clone, PartialEq)]
pub enum LeaseChange {
    Sent {
        sent_at: DateTime<Utc>,
    },
    Signed {
        signature: String,
        documents: Vec<TenantDocument>,
        signed_at: DateTime<Utc>,
    },
    Approved {
        approved_at: DateTime<Utc>,
        landlord_signature: Option<String>,
    },
    Rejected {
        notes: String,
    },
    // Limpa assinatura, documentos e signed_at do ciclo anterior
    RevisionRequested {
        notes: String,
    },
    Terminated {
        reason: String,
        terminated_at: DateTime<Utc>,
    },
    Expired {
        expired_at: DateTime<Utc>,
    },
}

impl LeaseChange {
    pub fn status(&self) -> LeaseStatus {
        match self {
            LeaseChange::Sent { .. } => LeaseStatus::SentToTenant,
            LeaseChange::Signed { .. } => LeaseStatus::TenantSigned,
            LeaseChange::Approved { .. } => LeaseStatus::Approved,
            LeaseChange::Rejected { .. } => LeaseStatus::Rejected,
            LeaseChange::RevisionRequested { .. } => LeaseStatus::RevisionRequested,
            LeaseChange::Terminated { .. } => LeaseStatus::Terminated,
            LeaseChange::Expired { .. } => LeaseStatus::Expired,
        }
    }

    /// Aplica a mudança sobre uma cópia em memória (mesma semântica dos UPDATEs).
    pub fn apply_to(&self, lease: &mut Lease, now: DateTime<Utc>) {
        lease.status = self.status();
        lease.updated_at = now;

        match self {
            LeaseChange::Sent { sent_at } => lease.sent_at = Some(*sent_at),
            LeaseChange::Signed { signature, documents, signed_at } => {
                lease.tenant_signature_data = Some(signature.clone());
                lease.tenant_documents = documents.clone();
                lease.signed_at = Some(*signed_at);
            }
            LeaseChange::Approved { approved_at, landlord_signature } => {
                lease.approved_at = Some(*approved_at);
                if landlord_signature.is_some() {
                    lease.landlord_signature_data = landlord_signature.clone();
                }
            }
            LeaseChange::Rejected { notes } => lease.landlord_notes = Some(notes.clone()),
            LeaseChange::RevisionRequested { notes } => {
                lease.landlord_notes = Some(notes.clone());
                lease.tenant_signature_data = None;
                lease.tenant_documents.clear();
                lease.signed_at = None;
            }
            LeaseChange::Terminated { reason, terminated_at } => {
                lease.termination_reason = Some(reason.clone());
                lease.terminated_at = Some(*terminated_at);
            }
            LeaseChange::Expired { expired_at } => lease.expired_at = Some(*expired_at),
        }
    }
}

/// Filtro da listagem de contratos.
#[derive(Debug, Clone, Default)]
pub struct LeaseFilter {
    pub landlord_id: Option<Uuid>,
    pub tenant_id: Option<Uuid>,
    pub property_id: Option<Uuid>,
}

impl LeaseFilter {
    pub fn matches(&self, lease: &Lease) -> bool {
        self.landlord_id.is_none_or(|id| lease.landlord_id == id)
            && self.tenant_id.is_none_or(|id| lease.tenant_id == id)
            && self.property_id.is_none_or(|id| lease.property_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table_accepts_only_listed_sources() {
        use LeaseAction::*;
        use LeaseStatus::*;

        let allowed = |action: LeaseAction, from: LeaseStatus| -> Option<LeaseStatus> {
            match (action, from) {
                (Send, Draft) => Some(SentToTenant),
                (Sign, SentToTenant) | (Sign, RevisionRequested) => Some(TenantSigned),
                (Approve, TenantSigned) => Some(Approved),
                (Reject, TenantSigned) => Some(Rejected),
                (RequestRevision, TenantSigned) => Some(RevisionRequested),
                (Terminate, Draft | SentToTenant | TenantSigned | RevisionRequested | Approved) => {
                    Some(Terminated)
                }
                (Expire, Approved) => Some(Expired),
                _ => None,
            }
        };

        for action in LeaseAction::ALL {
            for from in LeaseStatus::ALL {
                match (action.target(from), allowed(action, from)) {
                    (Ok(to), Some(expected)) => assert_eq!(to, expected, "{action:?} from {from}"),
                    (Err(AppError::InvalidState(msg)), None) => {
                        assert!(msg.contains(from.as_str()), "message should name {from}: {msg}")
                    }
                    (got, expected) => panic!("{action:?} from {from}: got {got:?}, expected {expected:?}"),
                }
            }
        }
    }

    #[test]
    fn sign_rejection_names_the_precondition() {
        let err = LeaseAction::Sign.target(LeaseStatus::Draft).unwrap_err();
        assert!(err.to_string().contains("não está pronto para assinatura"));
    }

    #[test]
    fn parses_document_kinds() {
        assert_eq!("id_front".parse::<DocumentKind>(), Ok(DocumentKind::IdFront));
        assert_eq!(" id_back ".parse::<DocumentKind>(), Ok(DocumentKind::IdBack));
        assert!("passport".parse::<DocumentKind>().is_err());
    }
}
