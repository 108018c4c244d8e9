pub mod auth;
pub use auth::AuthService;
pub mod document_service;
pub use document_service::{DocumentStore, UploadDirDocumentStore};
pub mod notification_service;
pub use notification_service::{EventSink, LogMailer, Mailer, NotificationDispatcher};
pub mod payment_scheduler;

pub mod lease_service;
pub use lease_service::{LeasePolicy, LeaseService};
pub mod payment_service;
pub use payment_service::PaymentService;
pub mod deposit_service;
pub use deposit_service::DepositService;
pub mod sweep_service;
pub use sweep_service::{SweepReport, SweepService};
