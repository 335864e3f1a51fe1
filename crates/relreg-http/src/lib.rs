//! HTTP front end for the release registry.
//!
//! Exposes the resolution engine as a read-only JSON API behind a
//! path-keyed response cache. Routes that must never be cached, or that are
//! materialized once at startup, are picked out by a strategy table.

pub mod cache;
pub mod config;
pub mod error;
pub mod metrics;
pub mod observability;
pub mod router;
pub mod routes;
pub mod server;
pub mod state;

pub use cache::{CacheStrategy, CachedResponse, ResponseCache, RouteTable};
pub use config::{CacheConfig, ConfigError, LogFormat, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use observability::init_logging;
pub use router::registry_router;
pub use server::serve;
pub use state::AppState;
