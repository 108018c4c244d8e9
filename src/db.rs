pub mod ledger;
pub use ledger::{LedgerStore, PropertyChange, TransitionPlan};
pub mod memory_ledger;
pub use memory_ledger::MemoryLedgerStore;
pub mod pg_ledger;
pub use pg_ledger::PgLedgerStore;

pub mod property_repo;
pub use property_repo::PropertyRepository;
pub mod lease_repo;
pub use lease_repo::LeaseRepository;
pub mod payment_repo;
pub use payment_repo::PaymentRepository;
pub mod deposit_repo;
pub use deposit_repo::DepositRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
