//! Backend library for the soapbox derby registration portal.
//!
//! The crate follows a hexagonal layout: `domain` holds the registration
//! aggregates, services, and ports; `inbound` and `outbound` hold the HTTP
//! and infrastructure adapters; `server` assembles the application.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request tracing middleware attaching a per-request trace identifier.
pub use middleware::Trace;
