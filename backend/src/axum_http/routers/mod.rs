pub mod admin;
pub mod payments;
pub mod quota;
pub mod subscriptions;
