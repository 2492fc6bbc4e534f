//! Outbound adapters implementing domain ports for infrastructure.
//!
//! - **persistence**: PostgreSQL-backed registration storage via Diesel
//! - **storage**: filesystem blob store for uploaded design files
//! - **email**: SMTP confirmation notifier
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations; no business logic lives here.

pub mod email;
pub mod persistence;
pub mod storage;
