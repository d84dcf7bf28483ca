//! HTTP adapter over the assessment service.
//!
//! Routes are nested under `/api/`. Everything except the health check
//! requires the caller's identity in `X-User-Id`.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer, ServerError};
pub use types::{ApiContext, UserContext};
