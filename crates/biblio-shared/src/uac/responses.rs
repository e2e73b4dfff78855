use crate::{id::DbId, token::AuthToken};

/// Body returned by the login endpoint
///
/// Does not include a durable numeric ID so the profile must be fetched
/// afterwards
#[derive(Debug, serde::Deserialize)]
pub struct LoginResponse {
    pub access_token: AuthToken,
    #[serde(default)]
    pub role: String,
    #[serde(default, rename = "nom")]
    pub last_name: String,
    #[serde(default, rename = "prenom")]
    pub first_name: String,
}

/// Body returned by the profile endpoint
#[derive(Debug, serde::Deserialize)]
pub struct ProfileResponse {
    pub id: DbId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "nom")]
    pub last_name: String,
    #[serde(default, rename = "prenom")]
    pub first_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub login: Option<String>,
}
