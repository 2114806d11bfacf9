use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Role granted to an authenticated user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Qa,
    Auditor,
    Vendor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Qa => "QA",
            Role::Auditor => "AUDITOR",
            Role::Vendor => "VENDOR",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "QA" => Ok(Role::Qa),
            "AUDITOR" => Ok(Role::Auditor),
            "VENDOR" => Ok(Role::Vendor),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// The authenticated caller, resolved by the auth layer and passed to every operation.
///
/// Carries no credentials; the auth layer has already verified the token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: Uuid, company_id: Uuid, role: Role) -> Self {
        Self { user_id, company_id, role }
    }

    pub fn admin(company_id: Uuid) -> Self {
        Self::new(Uuid::new_v4(), company_id, Role::Admin)
    }

    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing() {
        assert_eq!("qa".parse::<Role>().unwrap(), Role::Qa);
        assert_eq!("VENDOR".parse::<Role>().unwrap(), Role::Vendor);
        assert!("OPERATOR".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_check() {
        let actor = Actor::admin(Uuid::new_v4());
        assert!(actor.has_role(&[Role::Admin, Role::Qa]));
        assert!(!actor.has_role(&[Role::Vendor]));
    }
}
