//! Shared items related to user account control

mod errors;
mod responses;
mod role;
mod user;

pub use errors::UnknownRoleError;
pub use responses::{LoginResponse, ProfileResponse};
pub use role::Role;
pub use user::Identity;
