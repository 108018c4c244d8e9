pub mod deposits;
pub mod leases;
pub mod maintenance;
pub mod payments;
