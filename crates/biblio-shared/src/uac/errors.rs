#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum UnknownRoleError {
    #[error("unrecognised role received from the backend: '{0}'")]
    Unrecognised(String),
    #[error("a signed in user cannot have the anonymous role")]
    AnonymousPrincipal,
}
