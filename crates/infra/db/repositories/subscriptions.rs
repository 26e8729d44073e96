use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain,
    infra::db::postgres::{
        postgres_connection::PgPoolSquad,
        schema::{subscription_payments, subscriptions},
    },
};
use domain::{
    entities::subscriptions::{InsertSubscriptionEntity, SubscriptionEntity},
    repositories::subscriptions::SubscriptionRepository,
    value_objects::{
        enums::{subscriber_types::SubscriberType, subscription_statuses::SubscriptionStatus},
        subscriptions::SubscriptionCleanupResult,
        tenants::Tenant,
    },
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn find_by_id(&self, subscription_id: Uuid) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let subscription = subscriptions::table
            .find(subscription_id)
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(subscription)
    }

    async fn find_by_tenant(&self, tenant: Tenant) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let query = subscriptions::table
            .filter(subscriptions::subscriber_type.eq(tenant.scope.as_str()))
            .into_boxed();
        let query = match tenant.scope {
            SubscriberType::Doctor => query.filter(subscriptions::doctor_id.eq(tenant.scope_id)),
            SubscriberType::Hospital => {
                query.filter(subscriptions::hospital_id.eq(tenant.scope_id))
            }
        };

        let subscription = query
            .order(subscriptions::created_at.desc())
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()?;

        Ok(subscription)
    }

    async fn create(&self, subscription: InsertSubscriptionEntity) -> Result<SubscriptionEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let created = insert_into(subscriptions::table)
            .values(&subscription)
            .returning(SubscriptionEntity::as_returning())
            .get_result::<SubscriptionEntity>(&mut conn)?;

        Ok(created)
    }

    async fn update_status_and_period(
        &self,
        subscription_id: Uuid,
        status: SubscriptionStatus,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> Result<SubscriptionEntity> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(subscriptions::table.find(subscription_id))
            .set((
                subscriptions::status.eq(status.as_str()),
                subscriptions::start_date.eq(start_date),
                subscriptions::end_date.eq(end_date),
                subscriptions::updated_at.eq(Utc::now()),
            ))
            .returning(SubscriptionEntity::as_returning())
            .get_result::<SubscriptionEntity>(&mut conn)?;

        Ok(updated)
    }

    async fn delete_dead_subscriptions(
        &self,
        older_than: DateTime<Utc>,
        limit: i64,
    ) -> Result<SubscriptionCleanupResult> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let dead_statuses = [
            SubscriptionStatus::Inactive.as_str(),
            SubscriptionStatus::Expired.as_str(),
        ];

        let result = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let ids = subscriptions::table
                .filter(subscriptions::status.eq_any(dead_statuses))
                .filter(subscriptions::end_date.lt(older_than))
                .order(subscriptions::end_date.asc())
                .limit(limit)
                .select(subscriptions::id)
                .for_update()
                .skip_locked()
                .load::<Uuid>(conn)?;

            if ids.is_empty() {
                return Ok(SubscriptionCleanupResult::default());
            }

            let deleted_payments = diesel::delete(
                subscription_payments::table
                    .filter(subscription_payments::subscription_id.eq_any(&ids)),
            )
            .execute(conn)?;

            let deleted_subscriptions =
                diesel::delete(subscriptions::table.filter(subscriptions::id.eq_any(&ids)))
                    .execute(conn)?;

            Ok(SubscriptionCleanupResult {
                deleted_subscriptions,
                deleted_payments,
            })
        })?;

        Ok(result)
    }
}
