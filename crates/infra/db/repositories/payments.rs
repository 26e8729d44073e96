use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::{RunQueryDsl, insert_into, prelude::*};
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
    entities::{
        payments::{InsertSubscriptionPaymentEntity, SubscriptionPaymentEntity},
        subscriptions::{SubscriptionEntity, SubscriptionPeriodChangeset},
    },
    repositories::payments::PaymentRepository,
    value_objects::{
        enums::payment_statuses::PaymentStatus,
        finalization::{FinalizeOutcome, plan_finalization},
        order_intents::OrderIntent,
    },
};

pub struct PaymentPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl PaymentPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl PaymentRepository for PaymentPostgres {
    async fn record_pending_payment(
        &self,
        payment: InsertSubscriptionPaymentEntity,
    ) -> Result<Uuid> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment_id = insert_into(subscription_payments::table)
            .values(&payment)
            .returning(subscription_payments::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(payment_id)
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> Result<Option<SubscriptionPaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payment = subscription_payments::table
            .filter(subscription_payments::transaction_id.eq(transaction_id))
            .select(SubscriptionPaymentEntity::as_select())
            .first::<SubscriptionPaymentEntity>(&mut conn)
            .optional()?;

        Ok(payment)
    }

    async fn list_reconciliation_candidates(
        &self,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<SubscriptionPaymentEntity>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let payments = subscription_payments::table
            .filter(subscription_payments::status.eq(PaymentStatus::Pending.as_str()))
            .filter(subscription_payments::transaction_id.is_not_null())
            .filter(subscription_payments::payment_date.ge(since))
            .order(subscription_payments::payment_date.asc())
            .limit(limit)
            .select(SubscriptionPaymentEntity::as_select())
            .load::<SubscriptionPaymentEntity>(&mut conn)?;

        Ok(payments)
    }

    async fn finalize_payment(
        &self,
        order_id: &str,
        success: bool,
        now: DateTime<Utc>,
    ) -> Result<FinalizeOutcome> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        // Concurrent finalizers for the same order serialize on the payment row lock; the loser
        // then sees a terminal status and writes nothing.
        let outcome = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let Some(payment) = subscription_payments::table
                .filter(subscription_payments::transaction_id.eq(order_id))
                .select(SubscriptionPaymentEntity::as_select())
                .for_update()
                .first::<SubscriptionPaymentEntity>(conn)
                .optional()?
            else {
                return Ok(FinalizeOutcome::payment_not_found());
            };

            let subscription = match OrderIntent::parse(order_id) {
                Some(intent) => subscriptions::table
                    .find(intent.subscription_id())
                    .select(SubscriptionEntity::as_select())
                    .for_update()
                    .first::<SubscriptionEntity>(conn)
                    .optional()?,
                None => None,
            };

            let plan = plan_finalization(&payment, subscription.as_ref(), success, now);

            if let Some(status) = plan.payment_status {
                diesel::update(subscription_payments::table.find(payment.id))
                    .set((
                        subscription_payments::status.eq(status.as_str()),
                        subscription_payments::updated_at.eq(now),
                    ))
                    .execute(conn)?;
            }

            if let Some(update) = plan.subscription_update.as_ref() {
                diesel::update(subscriptions::table.find(update.subscription_id))
                    .set(SubscriptionPeriodChangeset::from_update(update, now))
                    .execute(conn)?;
            }

            Ok(plan.outcome)
        })?;

        Ok(outcome)
    }
}
