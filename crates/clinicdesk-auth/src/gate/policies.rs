//! Role-to-feature mapping definitions.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use clinicdesk_entity::user::UserRole;

/// A dashboard area whose access depends on the role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    /// Summary dashboard.
    Dashboard,
    /// Patient records.
    Patients,
    /// Appointment calendar.
    Appointments,
    /// Clinical cases.
    Cases,
    /// Treatment plans and records.
    Treatments,
    /// Invoices and payments.
    Billing,
    /// Authorization table administration.
    UserManagement,
    /// Full-table exports.
    DataBackup,
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dashboard => "dashboard",
            Self::Patients => "patients",
            Self::Appointments => "appointments",
            Self::Cases => "cases",
            Self::Treatments => "treatments",
            Self::Billing => "billing",
            Self::UserManagement => "user_management",
            Self::DataBackup => "data_backup",
        };
        write!(f, "{name}")
    }
}

/// Defines which features each role may open.
#[derive(Debug, Clone)]
pub struct FeaturePolicies {
    /// Role → set of features.
    policies: HashMap<UserRole, HashSet<Feature>>,
}

impl FeaturePolicies {
    /// Creates the default policy set.
    pub fn new() -> Self {
        let mut policies = HashMap::new();

        // Patient: their own appointments
        policies.insert(UserRole::Patient, HashSet::from([Feature::Appointments]));

        // Helper: front desk
        policies.insert(
            UserRole::Helper,
            HashSet::from([
                Feature::Dashboard,
                Feature::Patients,
                Feature::Appointments,
            ]),
        );

        // Doctor: clinical work and billing
        policies.insert(
            UserRole::Doctor,
            HashSet::from([
                Feature::Dashboard,
                Feature::Patients,
                Feature::Appointments,
                Feature::Cases,
                Feature::Treatments,
                Feature::Billing,
            ]),
        );

        // Admin: everything
        policies.insert(
            UserRole::Admin,
            HashSet::from([
                Feature::Dashboard,
                Feature::Patients,
                Feature::Appointments,
                Feature::Cases,
                Feature::Treatments,
                Feature::Billing,
                Feature::UserManagement,
                Feature::DataBackup,
            ]),
        );

        Self { policies }
    }

    /// Returns the set of features for the given role.
    pub fn features_for_role(&self, role: &UserRole) -> HashSet<Feature> {
        self.policies.get(role).cloned().unwrap_or_default()
    }

    /// Checks whether the given role may open the feature.
    pub fn allows(&self, role: &UserRole, feature: &Feature) -> bool {
        self.policies
            .get(role)
            .map(|features| features.contains(feature))
            .unwrap_or(false)
    }
}

impl Default for FeaturePolicies {
    fn default() -> Self {
        Self::new()
    }
}
