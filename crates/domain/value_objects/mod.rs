pub mod enums;
pub mod finalization;
pub mod gateway;
pub mod order_intents;
pub mod plans;
pub mod quotas;
pub mod subscription_lifecycle;
pub mod subscriptions;
pub mod tenants;
