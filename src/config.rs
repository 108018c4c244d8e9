// src/config.rs

use std::{env, path::PathBuf, str::FromStr, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{LedgerStore, MemoryLedgerStore, PgLedgerStore},
    models::lease::DocumentKind,
    services::{
        payment_scheduler::{SchedulePolicy, DEFAULT_DUE_DAY, DEFAULT_HORIZON_MONTHS},
        AuthService, DepositService, DocumentStore, EventSink, LeasePolicy, LeaseService, LogMailer,
        NotificationDispatcher, PaymentService, SweepService, UploadDirDocumentStore,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerBackend {
    Postgres,
    Memory,
}

impl FromStr for LedgerBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(LedgerBackend::Postgres),
            "memory" => Ok(LedgerBackend::Memory),
            other => Err(anyhow!("LEDGER_BACKEND inválido: {other} (use 'postgres' ou 'memory')")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub ledger_backend: LedgerBackend,
    pub payment_due_day: u32,
    pub schedule_horizon_months: u32,
    pub approval_schedule_months: u32,
    pub sweep_interval: Duration,
    pub upload_dir: PathBuf,
    pub public_files_url: String,
    pub max_upload_bytes: u64,
    pub required_document_kinds: Vec<DocumentKind>,
}

impl Settings {
    /// Lê o `.env` (se existir) e as variáveis de ambiente.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = lookup("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let ledger_backend = match lookup("LEDGER_BACKEND") {
            Some(raw) => raw.parse()?,
            None => LedgerBackend::Postgres,
        };

        let database_url = lookup("DATABASE_URL");
        if ledger_backend == LedgerBackend::Postgres && database_url.is_none() {
            return Err(anyhow!("DATABASE_URL deve ser definida"));
        }

        let required_document_kinds = match lookup("REQUIRED_DOCUMENT_KINDS") {
            Some(raw) => raw
                .split(',')
                .filter(|kind| !kind.trim().is_empty())
                .map(DocumentKind::from_str)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| anyhow!("REQUIRED_DOCUMENT_KINDS: {e}"))?,
            None => LeasePolicy::default().required_documents,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            ledger_backend,
            payment_due_day: parse_or(&lookup, "PAYMENT_DUE_DAY", DEFAULT_DUE_DAY)?,
            schedule_horizon_months: parse_or(&lookup, "SCHEDULE_HORIZON_MONTHS", DEFAULT_HORIZON_MONTHS)?,
            approval_schedule_months: parse_or(&lookup, "APPROVAL_SCHEDULE_MONTHS", 1)?,
            sweep_interval: Duration::from_secs(parse_or(&lookup, "SWEEP_INTERVAL_SECS", 24 * 60 * 60)?),
            upload_dir: lookup("UPLOAD_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from("uploads")),
            public_files_url: lookup("PUBLIC_FILES_URL").unwrap_or_else(|| "http://localhost:3000/files".to_string()),
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            required_document_kinds,
        })
    }

    pub fn lease_policy(&self) -> LeasePolicy {
        LeasePolicy {
            approval_schedule: SchedulePolicy::new(self.payment_due_day, self.approval_schedule_months),
            required_documents: self.required_document_kinds.clone(),
            ..LeasePolicy::default()
        }
    }

    pub fn schedule_policy(&self) -> SchedulePolicy {
        SchedulePolicy::new(self.payment_due_day, self.schedule_horizon_months)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} inválido ({raw}): {e}")),
        None => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub store: Arc<dyn LedgerStore>,
    pub auth_service: AuthService,
    pub lease_service: LeaseService,
    pub payment_service: PaymentService,
    pub deposit_service: DepositService,
    pub sweep_service: SweepService,
}

impl AppState {
    /// Conecta ao banco (ou monta o armazenamento em memória), roda as
    /// migrações e sobe a fila de notificações.
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let store: Arc<dyn LedgerStore> = match settings.ledger_backend {
            LedgerBackend::Postgres => {
                let database_url = settings
                    .database_url
                    .as_deref()
                    .context("DATABASE_URL deve ser definida")?;

                let db_pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;

                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!().run(&db_pool).await?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Arc::new(PgLedgerStore::new(db_pool))
            }
            LedgerBackend::Memory => {
                tracing::warn!("⚠️ Usando armazenamento em memória: nada será persistido");
                Arc::new(MemoryLedgerStore::new())
            }
        };

        let (dispatcher, _worker) = NotificationDispatcher::spawn(store.clone(), Arc::new(LogMailer));

        let documents = Arc::new(UploadDirDocumentStore::new(
            settings.upload_dir.clone(),
            settings.public_files_url.clone(),
            settings.max_upload_bytes,
        ));

        Ok(Self::from_parts(settings, store, documents, Arc::new(dispatcher)))
    }

    /// Monta o gráfico de dependências a partir de colaboradores prontos.
    pub fn from_parts(
        settings: Settings,
        store: Arc<dyn LedgerStore>,
        documents: Arc<dyn DocumentStore>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let auth_service = AuthService::new(settings.jwt_secret.clone());
        let lease_service = LeaseService::new(store.clone(), documents, events, settings.lease_policy());
        let payment_service = PaymentService::new(store.clone(), settings.schedule_policy());
        let deposit_service = DepositService::new(store.clone());
        let sweep_service = SweepService::new(store.clone(), lease_service.clone(), payment_service.clone());

        Self {
            settings: Arc::new(settings),
            store,
            auth_service,
            lease_service,
            payment_service,
            deposit_service,
            sweep_service,
        }
    }
}
