use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum QuotaKey {
    AppointmentsPerMonth,
    PatientsPerMonth,
    DoctorsPerHospital,
}

impl QuotaKey {
    pub const ALL: [QuotaKey; 3] = [
        QuotaKey::AppointmentsPerMonth,
        QuotaKey::PatientsPerMonth,
        QuotaKey::DoctorsPerHospital,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuotaKey::AppointmentsPerMonth => "appointmentsPerMonth",
            QuotaKey::PatientsPerMonth => "patientsPerMonth",
            QuotaKey::DoctorsPerHospital => "doctorsPerHospital",
        }
    }

    /// Label shown next to usage bars.
    pub fn label(&self) -> &'static str {
        match self {
            QuotaKey::AppointmentsPerMonth => "Rendez-vous ce mois",
            QuotaKey::PatientsPerMonth => "Patients ce mois",
            QuotaKey::DoctorsPerHospital => "Médecins",
        }
    }
}

impl Display for QuotaKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
