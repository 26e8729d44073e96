pub mod payments;
pub mod plans;
pub mod subscriptions;
pub mod usage;
