pub mod billing_intervals;
pub mod payment_methods;
pub mod payment_statuses;
pub mod plan_codes;
pub mod quota_keys;
pub mod subscriber_types;
pub mod subscription_statuses;
pub mod tenant_roles;
