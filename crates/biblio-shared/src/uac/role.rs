use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::UnknownRoleError;

/// Canonical role of the principal using the client
///
/// The backend is not consistent about how it spells roles (French and
/// English, varying case, two spellings of librarian) so raw role strings must
/// be converted with [`Role::from_backend`] as soon as they are received and
/// never compared anywhere else.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
)]
#[serde(try_from = "String", into = "String")]
#[strum(serialize_all = "snake_case")]
pub enum Role {
    #[default]
    Anonymous,
    Member,
    Staff,
    Administrator,
}

impl Role {
    /// Maps any spelling the backend is known to use onto a canonical role
    pub fn from_backend(raw: &str) -> Result<Self, UnknownRoleError> {
        let folded = fold(raw);
        Ok(match folded.as_str() {
            "" | "guest" | "anonymous" | "anonyme" => Self::Anonymous,
            "membre" | "member" => Self::Member,
            "agent" | "staff" | "bibliothecaire" | "bibliotecaire" | "librarian" => Self::Staff,
            "admin" | "administrateur" | "administrator" => Self::Administrator,
            _ => return Err(UnknownRoleError::Unrecognised(raw.to_string())),
        })
    }

    /// Same as [`Role::from_backend`] but rejects [`Role::Anonymous`] as it is
    /// not valid for someone who just signed in
    pub fn from_backend_principal(raw: &str) -> Result<Self, UnknownRoleError> {
        match Self::from_backend(raw)? {
            Self::Anonymous => Err(UnknownRoleError::AnonymousPrincipal),
            role => Ok(role),
        }
    }

    /// Returns `true` for roles that work the circulation desk
    #[must_use]
    pub fn is_staff_or_above(&self) -> bool {
        matches!(self, Self::Staff | Self::Administrator)
    }

    #[must_use]
    pub fn is_administrator(&self) -> bool {
        matches!(self, Self::Administrator)
    }
}

fn fold(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'à' | 'â' => 'a',
            'î' | 'ï' => 'i',
            _ => c,
        })
        .collect()
}

impl FromStr for Role {
    type Err = UnknownRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_backend(s)
    }
}

impl TryFrom<String> for Role {
    type Error = UnknownRoleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_backend(&value)
    }
}

impl From<Role> for String {
    fn from(value: Role) -> Self {
        value.as_ref().to_string()
    }
}
