//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel row structs and
//! domain types. Row structs (`models.rs`) and table definitions
//! (`schema.rs`) are internal details, never exposed to the domain.
//! Connections come from a `bb8` pool with native async support through
//! `diesel-async`.

mod diesel_registration_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_registration_repository::DieselRegistrationRepository;
pub use migrations::run_migrations;
pub use pool::{DbPool, PoolConfig, PoolError};
