// Colaboradores em memória compartilhados pelos testes de integração.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use rental_backend::{
    common::error::AppError,
    config::{AppState, Settings},
    db::{LedgerStore, MemoryLedgerStore},
    models::{
        auth::{Principal, Role},
        events::LeaseEvent,
        lease::{DocumentKind, Lease, TenantDocument},
        property::Property,
    },
    services::{
        document_service::{DocumentStore, DocumentUpload},
        lease_service::{CreateLease, SignLease},
        EventSink,
    },
};

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<LeaseEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<LeaseEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(LeaseEvent::kind).collect()
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, event: LeaseEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Aceita qualquer arquivo cujo tipo esteja na lista permitida.
pub struct FakeDocuments;

#[async_trait]
impl DocumentStore for FakeDocuments {
    async fn validate_and_resolve(
        &self,
        upload: &DocumentUpload,
        allowed_kinds: &[DocumentKind],
    ) -> Result<TenantDocument, AppError> {
        if !allowed_kinds.contains(&upload.kind) || upload.file_ref.ends_with(".exe") {
            return Err(AppError::Validation(format!("arquivo recusado: {}", upload.file_ref)));
        }

        Ok(TenantDocument {
            kind: upload.kind,
            file_ref: upload.file_ref.clone(),
            url: format!("https://files.test/{}", upload.file_ref),
        })
    }
}

pub const JWT_SECRET: &str = "segredo-de-teste";

pub fn settings() -> Settings {
    Settings::from_lookup(|key| match key {
        "JWT_SECRET" => Some(JWT_SECRET.to_string()),
        "LEDGER_BACKEND" => Some("memory".to_string()),
        _ => None,
    })
    .expect("test settings")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn dec(units: i64) -> Decimal {
    Decimal::new(units, 0)
}

pub struct Harness {
    pub store: Arc<MemoryLedgerStore>,
    pub events: Arc<RecordingSink>,
    pub state: AppState,
    pub landlord: Principal,
    pub tenant: Principal,
    pub admin: Principal,
    pub stranger: Principal,
    pub property: Property,
}

impl Harness {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryLedgerStore::new());
        let events = Arc::new(RecordingSink::default());

        let landlord = Principal::new(Uuid::new_v4(), Role::Landlord);
        let tenant = Principal::new(Uuid::new_v4(), Role::Tenant);
        let admin = Principal::new(Uuid::new_v4(), Role::Admin);
        let stranger = Principal::new(Uuid::new_v4(), Role::Tenant);

        store.insert_user(landlord.id, "locador@example.com").await;
        store.insert_user(tenant.id, "inquilino@example.com").await;
        let property = store.insert_property(landlord.id, "Apartamento 101", true).await;

        let ledger: Arc<dyn LedgerStore> = store.clone();
        let state = AppState::from_parts(settings(), ledger, Arc::new(FakeDocuments), events.clone());

        Self { store, events, state, landlord, tenant, admin, stranger, property }
    }

    pub async fn property(&self) -> Property {
        self.store.get_property(self.property.id).await.unwrap().unwrap()
    }

    pub async fn lease(&self, id: Uuid) -> Lease {
        self.store.get_lease(id).await.unwrap().unwrap()
    }

    pub fn lease_input(&self, start: NaiveDate, end: NaiveDate) -> CreateLease {
        CreateLease {
            property_id: self.property.id,
            tenant_id: self.tenant.id,
            start_date: start,
            end_date: end,
            monthly_rent: dec(1500),
            deposit_amount: dec(3000),
            document_content: serde_json::json!({ "clauses": ["Pagamento até o dia 1"] }),
        }
    }

    pub fn signature() -> SignLease {
        SignLease {
            signature_data: "data:image/png;base64,iVBORw0KGgo=".to_string(),
            documents: vec![
                DocumentUpload { kind: DocumentKind::IdFront, file_ref: "tenant/front.jpg".into() },
                DocumentUpload { kind: DocumentKind::IdBack, file_ref: "tenant/back.jpg".into() },
            ],
        }
    }

    pub async fn draft(&self, start: NaiveDate, end: NaiveDate) -> Lease {
        self.state
            .lease_service
            .create_lease(Some(&self.landlord), self.lease_input(start, end))
            .await
            .unwrap()
    }

    pub async fn signed(&self, start: NaiveDate, end: NaiveDate) -> Lease {
        let leases = &self.state.lease_service;
        let lease = self.draft(start, end).await;
        leases.send(Some(&self.landlord), lease.id).await.unwrap();
        leases.sign(Some(&self.tenant), lease.id, Self::signature()).await.unwrap()
    }

    pub async fn approved(&self, start: NaiveDate, end: NaiveDate) -> Lease {
        let lease = self.signed(start, end).await;
        self.state
            .lease_service
            .approve(Some(&self.landlord), lease.id, None)
            .await
            .unwrap()
    }
}
