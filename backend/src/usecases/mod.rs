pub mod admin_subscriptions;
pub mod checkout;
pub mod limit_summary;
pub mod payment_finalizer;
pub mod plan_catalog;
pub mod quota;
pub mod subscriptions;
