//! Client core of the library front-end
//!
//! Holds the [`SessionStore`] (who is logged in) and the [`Client`] every
//! screen goes through to reach the backend. Screens never build requests or
//! read the token themselves.
//!
//! NB: The assumption is made that the async runtime has already been started
//! before any functions from this library are called

#![warn(unused_crate_dependencies)]


mod client;
#[cfg(not(target_arch = "wasm32"))]
mod configuration;
mod errors;
mod image;
mod session;
pub mod storage;

pub use client::{
    options::{RequestBody, RequestOptions},
    Client, UiCallBack,
};
#[cfg(not(target_arch = "wasm32"))]
pub use configuration::{get_configuration, ClientConfig};
pub use errors::{normalize_error_body, normalize_error_payload, ApiError, NormalizedError};
pub use image::resolve_image_url;
pub use session::{Session, SessionEvent, SessionStore};
