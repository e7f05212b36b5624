//! Local JSON/HTTP API.
//!
//! Routes are nested under `/api/` and every request passes the access-log
//! middleware. `api_router()` returns a composable `Router`; `server`
//! binds and serves it with graceful shutdown.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{serve, start_api_server, ApiServer};
pub use types::ApiContext;
