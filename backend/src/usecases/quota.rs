use anyhow::{Result as AnyResult, anyhow};
use chrono::{DateTime, Datelike, TimeZone, Utc};
use crates::domain::{
    entities::subscriptions::SubscriptionEntity,
    repositories::{
        plans::PlanRepository, subscriptions::SubscriptionRepository,
        usage::TenantUsageRepository,
    },
    value_objects::{
        enums::{
            plan_codes::PlanCode, quota_keys::QuotaKey, subscriber_types::SubscriberType,
            subscription_statuses::SubscriptionStatus,
        },
        quotas::{QuotaReport, QuotaUsage},
        subscription_lifecycle::{add_months, effective_status},
        tenants::Tenant,
    },
};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::usecases::plan_catalog::PlanCatalog;

#[derive(Debug, Error)]
pub enum QuotaError {
    #[error("Appointment quota reached: plan allows {limit}, you have {current}")]
    AppointmentQuotaReached { limit: i64, current: i64 },
    #[error("Patient quota reached: plan allows {limit}, you have {current}")]
    PatientQuotaReached { limit: i64, current: i64 },
    #[error("Doctor quota reached: plan allows {limit}, you have {current}")]
    DoctorQuotaReached { limit: i64, current: i64 },
    #[error("Subscription is not active (status: {0})")]
    SubscriptionNotActive(SubscriptionStatus),
    #[error("session does not belong to a subscribing tenant")]
    NoTenant,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl QuotaError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            QuotaError::AppointmentQuotaReached { .. }
            | QuotaError::PatientQuotaReached { .. }
            | QuotaError::DoctorQuotaReached { .. }
            | QuotaError::SubscriptionNotActive(_) => StatusCode::FORBIDDEN,
            QuotaError::NoTenant => StatusCode::BAD_REQUEST,
            QuotaError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, QuotaError>;

/// Everything the gates and the limit summary need about one tenant at one instant.
#[derive(Debug, Clone)]
pub struct TenantQuotaSnapshot {
    pub subscription: Option<SubscriptionEntity>,
    pub plan: PlanCode,
    pub status: SubscriptionStatus,
    pub report: QuotaReport,
}

pub struct QuotaUseCase<P, S, U>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    U: TenantUsageRepository + Send + Sync + 'static,
{
    plan_catalog: Arc<PlanCatalog<P>>,
    subscription_repo: Arc<S>,
    usage_repo: Arc<U>,
}

impl<P, S, U> QuotaUseCase<P, S, U>
where
    P: PlanRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    U: TenantUsageRepository + Send + Sync + 'static,
{
    pub fn new(plan_catalog: Arc<PlanCatalog<P>>, subscription_repo: Arc<S>, usage_repo: Arc<U>) -> Self {
        Self {
            plan_catalog,
            subscription_repo,
            usage_repo,
        }
    }

    pub async fn snapshot(&self, tenant: Tenant, now: DateTime<Utc>) -> AnyResult<TenantQuotaSnapshot> {
        let subscription = self.subscription_repo.find_by_tenant(tenant).await?;
        let plan = match subscription.as_ref() {
            Some(subscription) => subscription.plan().unwrap_or_else(|| {
                warn!(
                    subscription_id = %subscription.id,
                    plan_code = %subscription.plan_code,
                    "quota: unknown plan code on subscription; using FREE limits"
                );
                PlanCode::Free
            }),
            None => PlanCode::Free,
        };
        let status = effective_status(subscription.as_ref(), now);
        let report = self.evaluate(tenant, plan, now).await?;

        debug!(
            scope = %tenant.scope,
            scope_id = %tenant.scope_id,
            %plan,
            %status,
            any_exceeded = report.any_exceeded,
            "quota: snapshot computed"
        );

        Ok(TenantQuotaSnapshot {
            subscription,
            plan,
            status,
            report,
        })
    }

    /// Usage for the current UTC calendar month against the plan's limits.
    pub async fn evaluate(
        &self,
        tenant: Tenant,
        plan: PlanCode,
        now: DateTime<Utc>,
    ) -> AnyResult<QuotaReport> {
        let limits = self.plan_catalog.limits_for(plan).await?.scoped_to(tenant.scope);
        let (from, until) = month_bounds(now)
            .ok_or_else(|| anyhow!("cannot compute month bounds for {now}"))?;

        let appointments_per_month = self
            .usage_repo
            .count_appointments_between(tenant, from, until)
            .await?;
        let patients_per_month = self
            .usage_repo
            .count_distinct_patients_between(tenant, from, until)
            .await?;
        let doctors_per_hospital = match tenant.scope {
            SubscriberType::Hospital => {
                self.usage_repo
                    .count_doctors_in_hospital(tenant.scope_id)
                    .await?
            }
            SubscriberType::Doctor => 0,
        };

        let usage = QuotaUsage {
            appointments_per_month,
            patients_per_month,
            doctors_per_hospital,
        };

        Ok(QuotaReport::evaluate(&limits, &usage))
    }

    /// Gate run before an appointment is confirmed. A patient already confirmed with the
    /// tenant does not count against the patient quota again.
    pub async fn check_appointment(
        &self,
        tenant: Tenant,
        patient_id: Uuid,
        appointment_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> UseCaseResult<()> {
        let snapshot = self.snapshot(tenant, now).await.map_err(|err| {
            error!(
                scope_id = %tenant.scope_id,
                db_error = ?err,
                "quota: failed to evaluate appointment gate"
            );
            QuotaError::Internal(err)
        })?;
        let report = &snapshot.report;

        if report.is_exceeded(QuotaKey::AppointmentsPerMonth) {
            let (limit, current) = reached(report, QuotaKey::AppointmentsPerMonth);
            info!(scope_id = %tenant.scope_id, limit, current, "quota: appointment quota reached");
            return Err(QuotaError::AppointmentQuotaReached { limit, current });
        }

        if report.is_exceeded(QuotaKey::PatientsPerMonth) {
            let known_patient = self
                .usage_repo
                .has_confirmed_appointment(tenant, patient_id, appointment_id)
                .await?;

            if !known_patient {
                let (limit, current) = reached(report, QuotaKey::PatientsPerMonth);
                info!(
                    scope_id = %tenant.scope_id,
                    %patient_id,
                    limit,
                    current,
                    "quota: patient quota reached for new patient"
                );
                return Err(QuotaError::PatientQuotaReached { limit, current });
            }
        }

        if !snapshot.status.is_usable() {
            info!(
                scope_id = %tenant.scope_id,
                status = %snapshot.status,
                "quota: subscription not active"
            );
            return Err(QuotaError::SubscriptionNotActive(snapshot.status));
        }

        Ok(())
    }

    /// Head-count gate for hospitals. Independent doctors always pass.
    pub async fn check_add_doctor(&self, tenant: Tenant, now: DateTime<Utc>) -> UseCaseResult<()> {
        if !tenant.is_hospital() {
            return Ok(());
        }

        let snapshot = self.snapshot(tenant, now).await?;
        if snapshot.report.is_exceeded(QuotaKey::DoctorsPerHospital) {
            let (limit, current) = reached(&snapshot.report, QuotaKey::DoctorsPerHospital);
            info!(scope_id = %tenant.scope_id, limit, current, "quota: doctor quota reached");
            return Err(QuotaError::DoctorQuotaReached { limit, current });
        }

        Ok(())
    }
}

fn reached(report: &QuotaReport, key: QuotaKey) -> (i64, i64) {
    (
        report.limit(key).as_option().unwrap_or_default(),
        report.current(key),
    )
}

fn month_bounds(now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()?;
    let end = add_months(start, 1)?;
    Some((start, end))
}
