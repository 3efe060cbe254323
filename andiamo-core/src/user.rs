//! Accounts and roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AndiamoError;

/// Access level stored with the session and sent by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    /// The other role; used by the admin role switch.
    pub fn toggled(&self) -> Role {
        match self {
            Role::User => Role::Admin,
            Role::Admin => Role::User,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AndiamoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ADMIN" => Ok(Role::Admin),
            other => Err(AndiamoError::Validation(format!("Unknown role '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// Body of a successful `POST /api/auth/login`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Head counts shown on the user management view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
    pub total: usize,
    pub admins: usize,
    pub users: usize,
}

impl UserStats {
    pub fn from_users(users: &[User]) -> Self {
        let admins = users.iter().filter(|u| u.role == Role::Admin).count();
        let regular = users.iter().filter(|u| u.role == Role::User).count();

        UserStats {
            total: users.len(),
            admins,
            users: regular,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64, role: Role) -> User {
        User {
            id,
            name: None,
            email: format!("user{id}@example.com"),
            role,
            image: None,
            created_at: None,
        }
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        let role: Role = serde_json::from_str("\"USER\"").unwrap();
        assert_eq!(role, Role::User);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("guest".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_toggle() {
        assert_eq!(Role::User.toggled(), Role::Admin);
        assert_eq!(Role::Admin.toggled(), Role::User);
    }

    #[test]
    fn test_user_stats() {
        let users = vec![user(1, Role::Admin), user(2, Role::User), user(3, Role::User)];
        let stats = UserStats::from_users(&users);
        assert_eq!(stats, UserStats { total: 3, admins: 1, users: 2 });
        assert_eq!(UserStats::from_users(&[]), UserStats::default());
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut u = user(1, Role::User);
        assert_eq!(u.display_name(), "user1@example.com");
        u.name = Some("Léa".to_string());
        assert_eq!(u.display_name(), "Léa");
    }

    #[test]
    fn test_login_response_deserializes() {
        let json =
            r#"{"token":"abc","user":{"id":5,"email":"a@b.fr","role":"ADMIN","image":null}}"#;
        let resp: LoginResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token, "abc");
        assert_eq!(resp.user.role, Role::Admin);
    }
}
