// src/services/lease_service.rs

//! Motor do ciclo de vida do contrato.
//!
//! Toda operação segue a mesma ordem: autenticação, autorização, status,
//! validação da entrada e só então a escrita. A escrita é um único
//! [`TransitionPlan`] (contrato + imóvel + pagamentos + caução); eventos só
//! são publicados depois que o plano foi gravado.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{
        authz::{can_act, can_manage_property, Relation},
        error::AppError,
        validation::required_text,
    },
    db::{LedgerStore, TransitionPlan},
    models::{
        auth::{Principal, Role},
        deposit::NewDeposit,
        events::LeaseEvent,
        lease::{DocumentKind, Lease, LeaseAction, LeaseChange, LeaseFilter, LeaseStatus, NewLease},
    },
    services::{
        document_service::{DocumentStore, DocumentUpload},
        notification_service::EventSink,
        payment_scheduler::{plan_rent_schedule, BillingTerms, SchedulePolicy},
    },
};

#[derive(Debug, Clone)]
pub struct LeasePolicy {
    /// Dia de vencimento e horizonte usados na aprovação.
    pub approval_schedule: SchedulePolicy,
    pub required_documents: Vec<DocumentKind>,
    pub allowed_documents: Vec<DocumentKind>,
}

impl Default for LeasePolicy {
    fn default() -> Self {
        Self {
            approval_schedule: SchedulePolicy::new(1, 1),
            required_documents: vec![DocumentKind::IdFront, DocumentKind::IdBack],
            allowed_documents: vec![
                DocumentKind::IdFront,
                DocumentKind::IdBack,
                DocumentKind::ProofOfIncome,
                DocumentKind::BankStatement,
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct CreateLease {
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_rent: Decimal,
    pub deposit_amount: Decimal,
    pub document_content: serde_json::Value,
}

#[derive(Debug, Clone)]
pub struct SignLease {
    pub signature_data: String,
    pub documents: Vec<DocumentUpload>,
}

#[derive(Clone)]
pub struct LeaseService {
    store: Arc<dyn LedgerStore>,
    documents: Arc<dyn DocumentStore>,
    events: Arc<dyn EventSink>,
    policy: LeasePolicy,
}

impl LeaseService {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        documents: Arc<dyn DocumentStore>,
        events: Arc<dyn EventSink>,
        policy: LeasePolicy,
    ) -> Self {
        Self { store, documents, events, policy }
    }

    // --- CRIAÇÃO E CONSULTA ---

    pub async fn create_lease(&self, actor: Option<&Principal>, input: CreateLease) -> Result<Lease, AppError> {
        let principal = actor.ok_or(AppError::Unauthenticated)?;

        let property = self.store
            .get_property(input.property_id)
            .await?
            .ok_or(AppError::NotFound("Imóvel"))?;

        can_manage_property(Some(principal), &property).into_result()?;

        if input.monthly_rent <= Decimal::ZERO {
            return Err(AppError::Validation("o aluguel mensal deve ser maior que zero".into()));
        }
        if input.deposit_amount < Decimal::ZERO {
            return Err(AppError::Validation("o valor da caução não pode ser negativo".into()));
        }
        if input.start_date >= input.end_date {
            return Err(AppError::Validation("a data de início deve ser anterior à data de término".into()));
        }
        if input.tenant_id == property.landlord_id {
            return Err(AppError::Validation("o locador não pode ser o inquilino do próprio imóvel".into()));
        }

        let lease = self.store
            .insert_lease(NewLease {
                property_id: property.id,
                tenant_id: input.tenant_id,
                landlord_id: property.landlord_id,
                start_date: input.start_date,
                end_date: input.end_date,
                monthly_rent: input.monthly_rent,
                deposit_amount: input.deposit_amount,
                document_content: match input.document_content {
                    serde_json::Value::Null => serde_json::json!({}),
                    content => content,
                },
            })
            .await?;

        tracing::info!(lease_id = %lease.id, property_id = %lease.property_id, "📝 Contrato criado em rascunho");

        Ok(lease)
    }

    pub async fn get_lease(&self, actor: Option<&Principal>, lease_id: Uuid) -> Result<Lease, AppError> {
        let lease = self.authorize(actor, lease_id, Relation::Participant).await?;
        Ok(lease)
    }

    pub async fn list_leases(
        &self,
        actor: Option<&Principal>,
        property_id: Option<Uuid>,
    ) -> Result<Vec<Lease>, AppError> {
        let principal = actor.ok_or(AppError::Unauthenticated)?;

        let mut filter = LeaseFilter { property_id, ..Default::default() };
        match principal.role {
            Role::Landlord => filter.landlord_id = Some(principal.id),
            Role::Tenant => filter.tenant_id = Some(principal.id),
            Role::Admin => {}
        }

        self.store.list_leases(filter).await
    }

    // --- TRANSIÇÕES ---

    pub async fn send(&self, actor: Option<&Principal>, lease_id: Uuid) -> Result<Lease, AppError> {
        let lease = self.authorize(actor, lease_id, Relation::Landlord).await?;
        LeaseAction::Send.target(lease.status)?;

        let plan = TransitionPlan::new(&lease, LeaseChange::Sent { sent_at: Utc::now() });
        let lease = self.commit(plan, LeaseAction::Send).await?;

        self.events.publish(LeaseEvent::LeaseSent { lease_id: lease.id, tenant_id: lease.tenant_id });

        Ok(lease)
    }

    pub async fn sign(&self, actor: Option<&Principal>, lease_id: Uuid, input: SignLease) -> Result<Lease, AppError> {
        let lease = self.authorize(actor, lease_id, Relation::Tenant).await?;
        LeaseAction::Sign.target(lease.status)?;

        let signature = required_text(&input.signature_data, "signatureData")?;
        self.check_required_documents(&input.documents)?;

        // Cada arquivo passa pelo armazenamento antes de aceitarmos a assinatura
        let mut documents = Vec::with_capacity(input.documents.len());
        for upload in &input.documents {
            let doc = self.documents
                .validate_and_resolve(upload, &self.policy.allowed_documents)
                .await?;
            documents.push(doc);
        }

        let plan = TransitionPlan::new(
            &lease,
            LeaseChange::Signed { signature, documents, signed_at: Utc::now() },
        );
        let lease = self.commit(plan, LeaseAction::Sign).await?;

        self.events.publish(LeaseEvent::LeaseSigned { lease_id: lease.id, landlord_id: lease.landlord_id });

        Ok(lease)
    }

    pub async fn approve(
        &self,
        actor: Option<&Principal>,
        lease_id: Uuid,
        landlord_signature: Option<String>,
    ) -> Result<Lease, AppError> {
        let lease = self.authorize(actor, lease_id, Relation::Landlord).await?;
        LeaseAction::Approve.target(lease.status)?;

        // Um único contrato aprovado por imóvel
        if let Some(current) = self.store.find_approved_lease(lease.property_id).await? {
            if current.id != lease.id {
                return Err(AppError::InvalidState(format!(
                    "o imóvel já possui o contrato aprovado {}",
                    current.id
                )));
            }
        }

        let existing: HashSet<NaiveDate> = self.store
            .list_payments(lease.id)
            .await?
            .into_iter()
            .map(|p| p.due_date)
            .collect();
        let payments = plan_rent_schedule(&BillingTerms::from(&lease), &existing, self.policy.approval_schedule);

        let deposit = if lease.deposit_amount > Decimal::ZERO
            && self.store.find_deposit_by_lease(lease.id).await?.is_none()
        {
            Some(NewDeposit { lease_id: lease.id, amount: lease.deposit_amount })
        } else {
            None
        };

        let change = LeaseChange::Approved {
            approved_at: Utc::now(),
            landlord_signature: landlord_signature.filter(|s| !s.trim().is_empty()),
        };
        let plan = TransitionPlan::new(&lease, change)
            .with_property(lease.property_id, false)
            .with_payments(payments)
            .with_deposit(deposit);
        let lease = self.commit(plan, LeaseAction::Approve).await?;

        self.events.publish(LeaseEvent::LeaseApproved { lease_id: lease.id, tenant_id: lease.tenant_id });

        Ok(lease)
    }

    pub async fn reject(&self, actor: Option<&Principal>, lease_id: Uuid, notes: &str) -> Result<Lease, AppError> {
        let lease = self.authorize(actor, lease_id, Relation::Landlord).await?;
        LeaseAction::Reject.target(lease.status)?;

        let notes = required_text(notes, "notes")?;

        let plan = TransitionPlan::new(&lease, LeaseChange::Rejected { notes: notes.clone() });
        let lease = self.commit(plan, LeaseAction::Reject).await?;

        self.events.publish(LeaseEvent::LeaseRejected { lease_id: lease.id, tenant_id: lease.tenant_id, notes });

        Ok(lease)
    }

    pub async fn request_revision(
        &self,
        actor: Option<&Principal>,
        lease_id: Uuid,
        notes: &str,
    ) -> Result<Lease, AppError> {
        let lease = self.authorize(actor, lease_id, Relation::Landlord).await?;
        LeaseAction::RequestRevision.target(lease.status)?;

        let notes = required_text(notes, "notes")?;

        let plan = TransitionPlan::new(&lease, LeaseChange::RevisionRequested { notes: notes.clone() });
        let lease = self.commit(plan, LeaseAction::RequestRevision).await?;

        self.events.publish(LeaseEvent::RevisionRequested { lease_id: lease.id, tenant_id: lease.tenant_id, notes });

        Ok(lease)
    }

    pub async fn terminate(&self, actor: Option<&Principal>, lease_id: Uuid, reason: &str) -> Result<Lease, AppError> {
        let lease = self.authorize(actor, lease_id, Relation::Landlord).await?;
        LeaseAction::Terminate.target(lease.status)?;

        let reason = required_text(reason, "reason")?;

        let mut plan = TransitionPlan::new(&lease, LeaseChange::Terminated { reason, terminated_at: Utc::now() });
        // Só quem sai de `approved` devolve o imóvel ao mercado
        if lease.status == LeaseStatus::Approved {
            plan = plan.with_property(lease.property_id, true);
        }

        self.commit(plan, LeaseAction::Terminate).await
    }

    /// Transição de sistema (varredura diária); não há principal.
    pub async fn expire(&self, lease: &Lease, today: NaiveDate) -> Result<Lease, AppError> {
        LeaseAction::Expire.target(lease.status)?;

        if lease.end_date >= today {
            return Err(AppError::InvalidState(format!(
                "o contrato ainda está vigente (término em {})",
                lease.end_date
            )));
        }

        let plan = TransitionPlan::new(lease, LeaseChange::Expired { expired_at: Utc::now() })
            .with_property(lease.property_id, true);

        self.commit(plan, LeaseAction::Expire).await
    }

    // --- AUXILIARES ---

    async fn authorize(
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

    fn check_required_documents(&self, uploads: &[DocumentUpload]) -> Result<(), AppError> {
        let provided: HashSet<DocumentKind> = uploads.iter().map(|u| u.kind).collect();

        if provided.len() != uploads.len() {
            return Err(AppError::Validation("envie apenas um arquivo por tipo de documento".into()));
        }

        let missing: Vec<&str> = self.policy
            .required_documents
            .iter()
            .filter(|kind| !provided.contains(kind))
            .map(|kind| kind.as_str())
            .collect();

        if !missing.is_empty() {
            return Err(AppError::Validation(format!(
                "documentos obrigatórios ausentes: {}",
                missing.join(", ")
            )));
        }

        Ok(())
    }

    async fn commit(&self, plan: TransitionPlan, action: LeaseAction) -> Result<Lease, AppError> {
        let from = plan.expected_status;
        let lease = self.store.apply_transition(plan).await?;

        tracing::info!(
            lease_id = %lease.id,
            ?action,
            %from,
            to = %lease.status,
            "✅ Transição de contrato aplicada"
        );

        Ok(lease)
    }
}
