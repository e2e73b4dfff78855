//! This module stores the expected format of the arguments for the requests
//! that the client core builds itself. Everything else the UI sends goes
//! through the generic request and is not described here.

use secrecy::{ExposeSecret, SecretString};
use std::fmt::Debug;

#[derive(serde::Deserialize, Clone)]
pub struct LoginReqArgs {
    /// Email for members, login for staff
    pub identifier: String,
    pub secret: SecretString,
}

impl LoginReqArgs {
    pub fn new<S: Into<String>>(identifier: S, secret: SecretString) -> Self {
        Self {
            identifier: identifier.into(),
            secret,
        }
    }

    pub fn secret(mut self, secret: SecretString) -> Self {
        self.secret = secret;
        self
    }

    /// The login endpoint only accepts form encoded fields named after the
    /// OAuth2 password flow
    pub fn to_form_fields(&self) -> Vec<(String, String)> {
        vec![
            ("username".to_string(), self.identifier.clone()),
            (
                "password".to_string(),
                self.secret.expose_secret().to_string(),
            ),
        ]
    }
}

impl Debug for LoginReqArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginReqArgs")
            .field("identifier", &self.identifier)
            .field("has_secret", &!self.secret.expose_secret().is_empty())
            .finish()
    }
}
