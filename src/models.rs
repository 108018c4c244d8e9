pub mod auth;
pub mod deposit;
pub mod events;
pub mod lease;
pub mod payment;
pub mod property;
