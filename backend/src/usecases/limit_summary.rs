use chrono::{DateTime, Utc};
use crates::domain::{
    repositories::{
        plans::PlanRepository, subscriptions::SubscriptionRepository,
        usage::TenantUsageRepository,
    },
    value_objects::{
        enums::{quota_keys::QuotaKey, subscriber_types::SubscriberType},
        subscription_lifecycle::expiry_window,
        subscriptions::{LimitSummaryDto, PrimaryUsageDto, UsageSummaryDto},
        tenants::{TenantIdentity, resolve_tenant},
    },
};
use std::sync::Arc;
use tracing::{debug, error};

use crate::usecases::quota::{QuotaError, QuotaUseCase, UseCaseResult};

/// Banner data for the signed-in tenant: plan, effective status, expiry and usage.
pub struct LimitSummaryUseCase<P, S, U>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    U: TenantUsageRepository + Send + Sync + 'static,
{
    quota: Arc<QuotaUseCase<P, S, U>>,
    grace_period_days: i64,
}

impl<P, S, U> LimitSummaryUseCase<P, S, U>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    U: TenantUsageRepository + Send + Sync + 'static,
{
    pub fn new(quota: Arc<QuotaUseCase<P, S, U>>, grace_period_days: i64) -> Self {
        Self {
            quota,
            grace_period_days,
        }
    }

    pub async fn summary(
        &self,
        identity: &TenantIdentity,
        now: DateTime<Utc>,
    ) -> UseCaseResult<LimitSummaryDto> {
        let Some(tenant) = resolve_tenant(identity) else {
            debug!(role = ?identity.role, "limit_summary: no tenant for session; hidden");
            return Ok(LimitSummaryDto::hidden());
        };

        let snapshot = self.quota.snapshot(tenant, now).await.map_err(|err| {
            error!(
                scope_id = %tenant.scope_id,
                db_error = ?err,
                "limit_summary: failed to build snapshot"
            );
            QuotaError::Internal(err)
        })?;

        let primary_key = match tenant.scope {
            SubscriberType::Hospital => QuotaKey::DoctorsPerHospital,
            SubscriberType::Doctor => QuotaKey::PatientsPerMonth,
        };
        let primary = snapshot.report.slot(primary_key);
        let window = snapshot
            .subscription
            .as_ref()
            .map(|subscription| expiry_window(subscription.end_date, now, self.grace_period_days));

        Ok(LimitSummaryDto {
            show: true,
            scope: Some(tenant.scope),
            role: identity.role,
            plan: Some(snapshot.plan),
            status: Some(snapshot.status),
            start_date: snapshot.subscription.as_ref().map(|s| s.start_date),
            end_date: snapshot.subscription.as_ref().map(|s| s.end_date),
            days_remaining: window.map(|w| w.days_remaining),
            days_overdue: window.map(|w| w.days_overdue),
            in_grace: window.map(|w| w.in_grace),
            can_add_more_doctors: tenant
                .is_hospital()
                .then(|| snapshot.report.slot(QuotaKey::DoctorsPerHospital).can_add_more),
            usage: Some(UsageSummaryDto {
                primary: PrimaryUsageDto {
                    key: primary.key,
                    current: primary.current,
                    limit: primary.limit,
                    label: primary.label,
                    remaining_slots: primary.remaining_slots,
                },
                full: snapshot.report,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::{
        plan_catalog::PlanCatalog,
        quota::tests::{plan_repo_with_limits, sample_subscription, usage_repo},
    };
    use chrono::TimeZone;
    use crates::domain::{
        repositories::{
            plans::MockPlanRepository, subscriptions::MockSubscriptionRepository,
            usage::MockTenantUsageRepository,
        },
        value_objects::{
            enums::{
                plan_codes::PlanCode, subscription_statuses::SubscriptionStatus,
                tenant_roles::TenantRole,
            },
            tenants::Tenant,
        },
    };
    use serde_json::json;
    use uuid::Uuid;

    fn summary_usecase(
        plan_repo: MockPlanRepository,
        subscription_repo: MockSubscriptionRepository,
        usage_repo: MockTenantUsageRepository,
        grace_period_days: i64,
    ) -> LimitSummaryUseCase<MockPlanRepository, MockSubscriptionRepository, MockTenantUsageRepository>
    {
        let catalog = PlanCatalog::new(Arc::new(plan_repo), "XOF".to_string());
        let quota = QuotaUseCase::new(
            Arc::new(catalog),
            Arc::new(subscription_repo),
            Arc::new(usage_repo),
        );
        LimitSummaryUseCase::new(Arc::new(quota), grace_period_days)
    }

    #[tokio::test]
    async fn patients_get_a_hidden_summary() {
        let usecase = summary_usecase(
            MockPlanRepository::new(),
            MockSubscriptionRepository::new(),
            MockTenantUsageRepository::new(),
            0,
        );
        let identity = TenantIdentity {
            role: Some(TenantRole::Patient),
            doctor_id: None,
            hospital_id: None,
        };

        let summary = usecase.summary(&identity, Utc::now()).await.unwrap();

        assert!(!summary.show);
        assert_eq!(serde_json::to_value(&summary).unwrap(), json!({ "show": false }));
    }

    #[tokio::test]
    async fn premium_doctor_sees_unlimited_patients() {
        let doctor_id = Uuid::new_v4();
        let tenant = Tenant::doctor(doctor_id);
        let now = Utc.with_ymd_and_hms(2024, 2, 10, 12, 0, 0).unwrap();
        let subscription = sample_subscription(
            tenant,
            PlanCode::Premium,
            SubscriptionStatus::Active,
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
        );

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_find_by_tenant().returning(move |_| {
            let subscription = subscription.clone();
            Box::pin(async move { Ok(Some(subscription)) })
        });

        let usecase = summary_usecase(
            plan_repo_with_limits(PlanCode::Premium, None, None, None),
            subscription_repo,
            usage_repo(42, 17, None),
            0,
        );
        let identity = TenantIdentity {
            role: Some(TenantRole::Doctor),
            doctor_id: Some(doctor_id),
            hospital_id: None,
        };

        let summary = usecase.summary(&identity, now).await.unwrap();
        let body = serde_json::to_value(&summary).unwrap();

        assert_eq!(body["show"], true);
        assert_eq!(body["plan"], "PREMIUM");
        assert_eq!(body["status"], "ACTIVE");
        assert_eq!(body["daysRemaining"], 19);
        assert_eq!(body["usage"]["primary"]["key"], "patientsPerMonth");
        assert_eq!(body["usage"]["primary"]["current"], 17);
        assert_eq!(body["usage"]["primary"]["remainingSlots"], "Illimité");
        assert_eq!(body["usage"]["full"]["exceeded"]["patientsPerMonth"], false);
        assert!(body.get("canAddMoreDoctors").is_none());
    }

    #[tokio::test]
    async fn overdue_hospital_reports_grace_and_doctor_capacity() {
        let hospital_id = Uuid::new_v4();
        let tenant = Tenant::hospital(hospital_id);
        let now = Utc.with_ymd_and_hms(2024, 2, 3, 0, 0, 0).unwrap();
        let subscription = sample_subscription(
            tenant,
            PlanCode::Free,
            SubscriptionStatus::Active,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
        );

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo.expect_find_by_tenant().returning(move |_| {
            let subscription = subscription.clone();
            Box::pin(async move { Ok(Some(subscription)) })
        });

        let usecase = summary_usecase(
            plan_repo_with_limits(PlanCode::Free, Some(20), Some(10), Some(10)),
            subscription_repo,
            usage_repo(0, 0, Some(10)),
            3,
        );
        let identity = TenantIdentity {
            role: Some(TenantRole::HospitalAdmin),
            doctor_id: None,
            hospital_id: Some(hospital_id),
        };

        let summary = usecase.summary(&identity, now).await.unwrap();

        assert_eq!(summary.status, Some(SubscriptionStatus::Expired));
        assert_eq!(summary.days_overdue, Some(2));
        assert_eq!(summary.in_grace, Some(true));
        assert_eq!(summary.can_add_more_doctors, Some(false));
        let usage = summary.usage.unwrap();
        assert_eq!(usage.primary.key, QuotaKey::DoctorsPerHospital);
        assert_eq!(usage.primary.current, 10);
    }
}
