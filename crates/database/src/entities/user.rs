//! User entity definitions

use serde::{Deserialize, Serialize};

/// User entity representing a user record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(skip_serializing)]
    #[serde(default)]
    pub password_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A fully validated record ready for insertion. The password has already
/// been hashed by the caller.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub password_hash: String,
}

/// Allow-listed fields for updating an existing user. Fields left as `None`
/// are untouched; `password_hash` must already be hashed.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub password_hash: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.role.is_none()
            && self.password_hash.is_none()
    }
}

/// User role enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "Project Manager")]
    ProjectManager,
    #[serde(rename = "Team Lead")]
    TeamLead,
    #[serde(rename = "Developer")]
    Developer,
}

impl UserRole {
    pub const ALL: [UserRole; 3] = [
        UserRole::ProjectManager,
        UserRole::TeamLead,
        UserRole::Developer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::ProjectManager => "Project Manager",
            UserRole::TeamLead => "Team Lead",
            UserRole::Developer => "Developer",
        }
    }

    /// Strict parse used by validation; unknown strings are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Project Manager" => Some(UserRole::ProjectManager),
            "Team Lead" => Some(UserRole::TeamLead),
            "Developer" => Some(UserRole::Developer),
            _ => None,
        }
    }
}

/// Lenient conversion for values read back from the store.
impl From<&str> for UserRole {
    fn from(s: &str) -> Self {
        UserRole::parse(s).unwrap_or(UserRole::Developer)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
