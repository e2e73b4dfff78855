use thiserror::Error;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Empty not allowed")]
    Empty,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("The user has not logged in")]
pub struct NotLoggedInError;
