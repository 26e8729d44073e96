use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use super::enums::{quota_keys::QuotaKey, subscriber_types::SubscriberType};

pub const UNLIMITED_LABEL: &str = "Illimité";

/// A plan cap. Serializes as the number, or `null` when uncapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Limit {
    Bounded(i64),
    #[default]
    Unlimited,
}

impl Limit {
    pub fn from_nullable(value: Option<i64>) -> Self {
        match value {
            Some(max) => Limit::Bounded(max.max(0)),
            None => Limit::Unlimited,
        }
    }

    pub fn as_option(&self) -> Option<i64> {
        match self {
            Limit::Bounded(max) => Some(*max),
            Limit::Unlimited => None,
        }
    }

    pub fn is_exceeded_by(&self, usage: i64) -> bool {
        match self {
            Limit::Bounded(max) => usage >= *max,
            Limit::Unlimited => false,
        }
    }

    pub fn remaining(&self, usage: i64) -> RemainingSlots {
        match self {
            Limit::Bounded(max) => RemainingSlots::Count((max - usage).max(0)),
            Limit::Unlimited => RemainingSlots::Unlimited,
        }
    }
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Limit::Bounded(max) => serializer.serialize_i64(*max),
            Limit::Unlimited => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainingSlots {
    Count(i64),
    Unlimited,
}

impl Serialize for RemainingSlots {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RemainingSlots::Count(left) => serializer.serialize_i64(*left),
            RemainingSlots::Unlimited => serializer.serialize_str(UNLIMITED_LABEL),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanQuotaLimits {
    pub appointments_per_month: Limit,
    pub patients_per_month: Limit,
    pub doctors_per_hospital: Limit,
    pub storage_gb: Limit,
}

impl PlanQuotaLimits {
    pub fn limit_for(&self, key: QuotaKey) -> Limit {
        match key {
            QuotaKey::AppointmentsPerMonth => self.appointments_per_month,
            QuotaKey::PatientsPerMonth => self.patients_per_month,
            QuotaKey::DoctorsPerHospital => self.doctors_per_hospital,
        }
    }

    /// Head-count caps only bind hospitals.
    pub fn scoped_to(mut self, scope: SubscriberType) -> Self {
        if scope == SubscriberType::Doctor {
            self.doctors_per_hospital = Limit::Unlimited;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QuotaUsage {
    pub appointments_per_month: i64,
    pub patients_per_month: i64,
    pub doctors_per_hospital: i64,
}

impl QuotaUsage {
    pub fn usage_for(&self, key: QuotaKey) -> i64 {
        let raw = match key {
            QuotaKey::AppointmentsPerMonth => self.appointments_per_month,
            QuotaKey::PatientsPerMonth => self.patients_per_month,
            QuotaKey::DoctorsPerHospital => self.doctors_per_hospital,
        };
        raw.max(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaReport {
    pub limits: BTreeMap<QuotaKey, Limit>,
    pub usage: BTreeMap<QuotaKey, i64>,
    pub exceeded: BTreeMap<QuotaKey, bool>,
    pub any_exceeded: bool,
}

impl QuotaReport {
    pub fn evaluate(limits: &PlanQuotaLimits, usage: &QuotaUsage) -> Self {
        let mut report = QuotaReport {
            limits: BTreeMap::new(),
            usage: BTreeMap::new(),
            exceeded: BTreeMap::new(),
            any_exceeded: false,
        };

        for key in QuotaKey::ALL {
            let limit = limits.limit_for(key);
            let current = usage.usage_for(key);
            let exceeded = limit.is_exceeded_by(current);

            report.limits.insert(key, limit);
            report.usage.insert(key, current);
            report.exceeded.insert(key, exceeded);
            report.any_exceeded |= exceeded;
        }

        report
    }

    pub fn limit(&self, key: QuotaKey) -> Limit {
        self.limits.get(&key).copied().unwrap_or_default()
    }

    pub fn current(&self, key: QuotaKey) -> i64 {
        self.usage.get(&key).copied().unwrap_or_default()
    }

    pub fn is_exceeded(&self, key: QuotaKey) -> bool {
        self.exceeded.get(&key).copied().unwrap_or(false)
    }

    pub fn slot(&self, key: QuotaKey) -> QuotaSlot {
        let limit = self.limit(key);
        let current = self.current(key);
        QuotaSlot {
            key,
            current,
            limit,
            label: key.label(),
            remaining_slots: limit.remaining(current),
            can_add_more: !limit.is_exceeded_by(current),
        }
    }
}

/// One quota dimension as shown to the tenant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaSlot {
    pub key: QuotaKey,
    pub current: i64,
    pub limit: Limit,
    pub label: &'static str,
    pub remaining_slots: RemainingSlots,
    pub can_add_more: bool,
}
