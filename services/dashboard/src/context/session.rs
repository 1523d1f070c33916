//! services/dashboard/src/context/session.rs
//!
//! The signed-in user and the role that decides which dashboard they get.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Farmer,
    Buyer,
    Admin,
}

impl Role {
    /// Only admins move reports through review.
    pub fn can_review_reports(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Farmers and admins run field work; buyers only see outcomes.
    pub fn can_manage_tasks(&self) -> bool {
        matches!(self, Role::Farmer | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Farmer => "farmer",
            Role::Buyer => "buyer",
            Role::Admin => "admin",
        })
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "farmer" => Ok(Role::Farmer),
            "buyer" => Ok(Role::Buyer),
            "admin" => Ok(Role::Admin),
            other => Err(format!("'{}' is not a dashboard role", other)),
        }
    }
}

// Represents the signed-in user for the lifetime of one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_name: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_and_gate_actions() {
        let admin: Role = "ADMIN".parse().unwrap();
        assert!(admin.can_review_reports());
        let buyer: Role = "buyer".parse().unwrap();
        assert!(!buyer.can_manage_tasks());
        assert!(!buyer.can_review_reports());
        assert!("grower".parse::<Role>().is_err());
    }
}
