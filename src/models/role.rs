// Roles and the acting user

//! # Roles
//!
//! Every step of a process is owned by exactly one [`Role`]. The identity
//! collaborator hands the core an [`Actor`] (role, department, region) which is
//! passed explicitly into every access check; nothing here reads ambient state.
//!
//! Role tokens arrive from the identity store in several spellings (`"RH"`,
//! `"Gestor"`, `"hr"`, `"Manager"` ...). Parsing never fails: anything that is not
//! a known token becomes [`Role::Unrecognized`], which the access gate always
//! denies.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of roles known to the workflow core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    /// Human resources, owns the first step of both flows
    Hr,
    /// Direct manager of the employee
    Manager,
    /// IT / tech support
    It,
    /// The employee being admitted
    Employee,
    /// Payroll and compliance, owns the last demission step
    Payroll,
    /// Administrative override: may edit any step
    Admin,
    /// Any token the core does not know; never allowed to edit
    Unrecognized,
}

impl Role {
    /// All roles that can own a step, in flow order
    pub const STEP_OWNERS: [Role; 5] = [Role::Hr, Role::Manager, Role::It, Role::Employee, Role::Payroll];

    /// Parse a role token, case-insensitively
    ///
    /// Accepts the canonical snake-case tokens, the display labels and the
    /// tokens used by the identity store.
    ///
    /// ```rust
    /// # use hr_workflow::Role;
    /// assert_eq!(Role::parse("Gestor"), Role::Manager);
    /// assert_eq!(Role::parse(" it "), Role::It);
    /// assert_eq!(Role::parse("janitor"), Role::Unrecognized);
    /// ```
    pub fn parse(token: &str) -> Self {
        match token.trim().to_lowercase().as_str() {
            "hr" | "rh" => Role::Hr,
            "manager" | "gestor" => Role::Manager,
            "it" | "ti" => Role::It,
            "employee" | "colaborador" => Role::Employee,
            "payroll" | "dp" => Role::Payroll,
            "admin" | "adm" => Role::Admin,
            _ => Role::Unrecognized,
        }
    }

    /// Canonical token used in serialized records
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Hr => "hr",
            Role::Manager => "manager",
            Role::It => "it",
            Role::Employee => "employee",
            Role::Payroll => "payroll",
            Role::Admin => "admin",
            Role::Unrecognized => "unrecognized",
        }
    }

    /// Short label shown next to checklist tasks
    pub fn label(&self) -> &'static str {
        match self {
            Role::Hr => "HR",
            Role::Manager => "Manager",
            Role::It => "IT",
            Role::Employee => "Employee",
            Role::Payroll => "Payroll",
            Role::Admin => "Admin",
            Role::Unrecognized => "Unrecognized",
        }
    }

    /// Whether this role bypasses step ownership
    pub fn is_override(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl From<String> for Role {
    fn from(token: String) -> Self {
        Role::parse(&token)
    }
}

impl From<&str> for Role {
    fn from(token: &str) -> Self {
        Role::parse(token)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The acting user, as supplied by the identity collaborator
///
/// Read-only to the core. `department` and `region` are only consulted by the
/// manager scope check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub role: Role,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl Actor {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            department: None,
            region: None,
        }
    }

    pub fn with_department<S: Into<String>>(mut self, department: S) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        self.region = Some(region.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_store_tokens_and_labels() {
        assert_eq!(Role::parse("RH"), Role::Hr);
        assert_eq!(Role::parse("hr"), Role::Hr);
        assert_eq!(Role::parse("TI"), Role::It);
        assert_eq!(Role::parse("Colaborador"), Role::Employee);
        assert_eq!(Role::parse("DP"), Role::Payroll);
        assert_eq!(Role::parse("Adm"), Role::Admin);
        assert_eq!(Role::parse("Payroll"), Role::Payroll);
        assert_eq!(Role::parse(""), Role::Unrecognized);
        assert_eq!(Role::parse("superuser"), Role::Unrecognized);
    }

    #[test]
    fn test_role_serde_round_trip_uses_canonical_token() {
        let json = serde_json::to_string(&Role::Manager).unwrap();
        assert_eq!(json, "\"manager\"");

        let role: Role = serde_json::from_str("\"Gestor\"").unwrap();
        assert_eq!(role, Role::Manager);

        let unknown: Role = serde_json::from_str("\"Visitor\"").unwrap();
        assert_eq!(unknown, Role::Unrecognized);
    }

    #[test]
    fn test_only_admin_overrides() {
        assert!(Role::Admin.is_override());
        for role in Role::STEP_OWNERS {
            assert!(!role.is_override());
        }
        assert!(!Role::Unrecognized.is_override());
    }

    #[test]
    fn test_actor_deserializes_without_scope() {
        let actor: Actor = serde_json::from_str(r#"{"role": "TI"}"#).unwrap();
        assert_eq!(actor, Actor::new(Role::It));
    }
}
