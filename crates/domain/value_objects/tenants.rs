use serde::Serialize;
use uuid::Uuid;

use super::enums::{subscriber_types::SubscriberType, tenant_roles::TenantRole};

/// The subscribing entity a request acts for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub scope: SubscriberType,
    pub scope_id: Uuid,
}

impl Tenant {
    pub fn doctor(doctor_id: Uuid) -> Self {
        Self {
            scope: SubscriberType::Doctor,
            scope_id: doctor_id,
        }
    }

    pub fn hospital(hospital_id: Uuid) -> Self {
        Self {
            scope: SubscriberType::Hospital,
            scope_id: hospital_id,
        }
    }

    pub fn is_hospital(&self) -> bool {
        self.scope == SubscriberType::Hospital
    }
}

/// Identity fields the resolver needs from the caller's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantIdentity {
    pub role: Option<TenantRole>,
    pub doctor_id: Option<Uuid>,
    pub hospital_id: Option<Uuid>,
}

/// A doctor attached to a hospital is billed through the hospital.
pub fn resolve_tenant(identity: &TenantIdentity) -> Option<Tenant> {
    match identity.role? {
        TenantRole::Doctor => match identity.hospital_id {
            Some(hospital_id) => Some(Tenant::hospital(hospital_id)),
            None => identity.doctor_id.map(Tenant::doctor),
        },
        TenantRole::HospitalAdmin => identity.hospital_id.map(Tenant::hospital),
        TenantRole::Patient | TenantRole::Admin => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(
        role: Option<TenantRole>,
        doctor_id: Option<Uuid>,
        hospital_id: Option<Uuid>,
    ) -> TenantIdentity {
        TenantIdentity {
            role,
            doctor_id,
            hospital_id,
        }
    }

    #[test]
    fn hospital_doctor_resolves_to_hospital() {
        let doctor_id = Uuid::new_v4();
        let hospital_id = Uuid::new_v4();

        let tenant = resolve_tenant(&identity(
            Some(TenantRole::Doctor),
            Some(doctor_id),
            Some(hospital_id),
        ));

        assert_eq!(tenant, Some(Tenant::hospital(hospital_id)));
    }

    #[test]
    fn independent_doctor_resolves_to_self() {
        let doctor_id = Uuid::new_v4();

        let tenant = resolve_tenant(&identity(Some(TenantRole::Doctor), Some(doctor_id), None));

        assert_eq!(tenant, Some(Tenant::doctor(doctor_id)));
    }

    #[test]
    fn hospital_admin_without_hospital_has_no_tenant() {
        assert_eq!(
            resolve_tenant(&identity(Some(TenantRole::HospitalAdmin), None, None)),
            None
        );
    }

    #[test]
    fn patients_and_unknown_roles_have_no_tenant() {
        let id = Some(Uuid::new_v4());
        assert_eq!(resolve_tenant(&identity(Some(TenantRole::Patient), id, id)), None);
        assert_eq!(resolve_tenant(&identity(Some(TenantRole::Admin), id, id)), None);
        assert_eq!(resolve_tenant(&identity(None, id, id)), None);
    }
}
