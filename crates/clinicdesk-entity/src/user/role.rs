//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles stored in the authorization table.
///
/// `Unauthorized` is the deny-state: it is what every failed, missing, or
/// inactive lookup degrades to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Clinic administrator.
    Admin,
    /// Treating dentist.
    Doctor,
    /// Front desk / dental assistant.
    Helper,
    /// Patient with portal access.
    Patient,
    /// No access.
    #[default]
    Unauthorized,
}

impl UserRole {
    /// Roles that grant access to the dashboard.
    pub const GRANTING: [UserRole; 4] = [
        UserRole::Admin,
        UserRole::Doctor,
        UserRole::Helper,
        UserRole::Patient,
    ];

    /// Check if this role passes the access gate.
    pub fn is_authorized(&self) -> bool {
        !matches!(self, Self::Unauthorized)
    }

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Doctor => "doctor",
            Self::Helper => "helper",
            Self::Patient => "patient",
            Self::Unauthorized => "unauthorized",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = clinicdesk_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "doctor" => Ok(Self::Doctor),
            "helper" => Ok(Self::Helper),
            "patient" => Ok(Self::Patient),
            "unauthorized" => Ok(Self::Unauthorized),
            _ => Err(clinicdesk_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, doctor, helper, patient, unauthorized"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unauthorized_is_denied() {
        for role in UserRole::GRANTING {
            assert!(role.is_authorized(), "{role} should be authorized");
        }
        assert!(!UserRole::Unauthorized.is_authorized());
        assert_eq!(UserRole::default(), UserRole::Unauthorized);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("doctor".parse::<UserRole>().unwrap(), UserRole::Doctor);
        assert_eq!("HELPER".parse::<UserRole>().unwrap(), UserRole::Helper);
        assert!("dentist".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&UserRole::Patient).unwrap();
        assert_eq!(json, "\"patient\"");
        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, UserRole::Admin);
    }
}
