//! HTTP inbound adapter exposing the registration portal REST API.

pub mod admin;
pub mod error;
pub mod health;
pub mod registrations;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;
