//! Authenticated principal and role types
//!
//! The authentication layer is an external collaborator. It verifies the
//! caller and forwards `{id, role}`; everything in this workspace trusts that
//! pair and only enforces ownership rules on top of it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// User role, immutable after account creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Student,
    Lecturer,
    /// Program Leader: owns one or more programs
    Pl,
    /// Principal Lecturer: owns a stream
    Prl,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Lecturer => "lecturer",
            Role::Pl => "pl",
            Role::Prl => "prl",
        }
    }

    /// Supervisory roles resolve a scope through the hierarchy
    pub fn is_supervisor(&self) -> bool {
        matches!(self, Role::Pl | Role::Prl)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "lecturer" => Ok(Role::Lecturer),
            "pl" => Ok(Role::Pl),
            "prl" => Ok(Role::Prl),
            other => Err(Error::InvalidInput(format!("Unknown role: {}", other))),
        }
    }
}

/// Authenticated caller attached to every request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: i64,
    pub role: Role,
}

impl Principal {
    pub fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }

    /// Reject the call unless the principal holds `role`
    pub fn require_role(&self, role: Role) -> crate::Result<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(Error::Forbidden(format!(
                "role '{}' required, caller is '{}'",
                role, self.role
            )))
        }
    }

    /// Reject the call unless the principal is `role` acting on its own `id`
    pub fn require_self(&self, role: Role, id: i64) -> crate::Result<()> {
        self.require_role(role)?;
        if self.id == id {
            Ok(())
        } else {
            Err(Error::Forbidden(format!(
                "{} {} may not act for {}",
                role, self.id, id
            )))
        }
    }
}
