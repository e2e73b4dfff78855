#![cfg(not(target_arch = "wasm32"))]

mod login;
mod session_expiry;
