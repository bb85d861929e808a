//! service-core: Shared infrastructure for coopworks back-office services.
pub mod config;
pub mod error;
pub mod observability;

pub use serde;
pub use serde_json;
pub use tracing;
