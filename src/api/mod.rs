//! HTTP API.
//!
//! Exposes the booking platform as REST endpoints for patient, doctor and
//! admin clients. Routes are nested under `/api/` and, apart from the public
//! catalog and auth surface, protected by a bearer-token middleware layer.
//!
//! The router is composable — `api_router()` returns a `Router` that can be
//! mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::serve;
pub use types::ApiContext;
