use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, dsl::count_distinct, pg::Pg, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{appointments, doctors},
    },
};
use domain::{
    repositories::usage::TenantUsageRepository,
    value_objects::{enums::subscriber_types::SubscriberType, tenants::Tenant},
};

const CANCELLED: &str = "CANCELLED";
const CONFIRMED: &str = "CONFIRMED";

pub struct TenantUsagePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl TenantUsagePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn tenant_appointments(tenant: Tenant) -> appointments::BoxedQuery<'static, Pg> {
    let query = appointments::table.into_boxed();
    match tenant.scope {
        SubscriberType::Doctor => query.filter(appointments::doctor_id.eq(tenant.scope_id)),
        SubscriberType::Hospital => query.filter(appointments::hospital_id.eq(tenant.scope_id)),
    }
}

#[async_trait]
impl TenantUsageRepository for TenantUsagePostgres {
    async fn count_appointments_between(
        &self,
        tenant: Tenant,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = tenant_appointments(tenant)
            .filter(appointments::created_at.ge(from))
            .filter(appointments::created_at.lt(until))
            .filter(appointments::status.ne(CANCELLED))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }

    async fn count_distinct_patients_between(
        &self,
        tenant: Tenant,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = tenant_appointments(tenant)
            .filter(appointments::created_at.ge(from))
            .filter(appointments::created_at.lt(until))
            .filter(appointments::status.ne(CANCELLED))
            .select(count_distinct(appointments::patient_id))
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }

    async fn count_doctors_in_hospital(&self, hospital_id: Uuid) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let count = doctors::table
            .filter(doctors::hospital_id.eq(hospital_id))
            .count()
            .get_result::<i64>(&mut conn)?;

        Ok(count)
    }

    async fn has_confirmed_appointment(
        &self,
        tenant: Tenant,
        patient_id: Uuid,
        excluding_appointment_id: Option<Uuid>,
    ) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = tenant_appointments(tenant)
            .filter(appointments::patient_id.eq(patient_id))
            .filter(appointments::status.eq(CONFIRMED));
        if let Some(appointment_id) = excluding_appointment_id {
            query = query.filter(appointments::id.ne(appointment_id));
        }

        let found = query
            .select(appointments::id)
            .first::<Uuid>(&mut conn)
            .optional()?;

        Ok(found.is_some())
    }
}
