use std::fmt::Debug;

use crate::errors::ConversionError;

/// Opaque bearer credential issued by the backend at login
#[derive(serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(try_from = "String")]
pub struct AuthToken(String);

impl AuthToken {
    /// Raw token to be sent to the backend or persisted. Never log the result.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AuthToken {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(ConversionError::Empty);
        }
        Ok(Self(value))
    }
}

impl TryFrom<&str> for AuthToken {
    type Error = ConversionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.to_string().try_into()
    }
}

impl Debug for AuthToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AuthToken").field(&"[REDACTED]").finish()
    }
}
