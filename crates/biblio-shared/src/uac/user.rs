use std::fmt::Display;

use crate::id::DbId;

use super::{LoginResponse, ProfileResponse, Role, UnknownRoleError};

/// Describes the signed in principal
///
/// This is the form that is persisted alongside the token
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: DbId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
}

impl Identity {
    /// Composes the identity from the two responses of the login exchange
    ///
    /// The profile is authoritative, the login response only fills in what the
    /// profile left empty
    pub fn compose(login: &LoginResponse, profile: ProfileResponse) -> Result<Self, UnknownRoleError> {
        let raw_role = if profile.role.trim().is_empty() {
            &login.role
        } else {
            &profile.role
        };
        let role = Role::from_backend_principal(raw_role)?;
        let first_name = if profile.first_name.is_empty() {
            login.first_name.clone()
        } else {
            profile.first_name
        };
        let last_name = if profile.last_name.is_empty() {
            login.last_name.clone()
        } else {
            profile.last_name
        };
        Ok(Self {
            id: profile.id,
            email: profile.email.unwrap_or_default(),
            first_name,
            last_name,
            role,
            login: profile.login,
        })
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}> ({})", self.display_name(), self.email, self.role)
    }
}
