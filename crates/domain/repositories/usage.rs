use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::domain::value_objects::tenants::Tenant;

/// Read-only counters over the appointment and staffing tables.
#[async_trait]
#[automock]
pub trait TenantUsageRepository {
    async fn count_appointments_between(
        &self,
        tenant: Tenant,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<i64>;

    async fn count_distinct_patients_between(
        &self,
        tenant: Tenant,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<i64>;

    async fn count_doctors_in_hospital(&self, hospital_id: Uuid) -> Result<i64>;

    async fn has_confirmed_appointment(
        &self,
        tenant: Tenant,
        patient_id: Uuid,
        excluding_appointment_id: Option<Uuid>,
    ) -> Result<bool>;
}
