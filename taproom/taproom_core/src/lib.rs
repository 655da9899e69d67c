//! # Taproom Core
//!
//! `taproom_core` provides the shared building blocks for the Taproom coordination
//! engine: error types, identifiers, configuration, and the order data model that
//! flows between requesters and fulfillment workers.
//!
//! ## Crate Structure
//!
//! - **error**: Error types for configuration and order validation
//! - **id**: Strongly-typed identifiers
//! - **types**: Orders and their lifecycle states
//! - **config**: Construction-time configuration, loadable from TOML

pub mod config;
pub mod error;
pub mod id;
pub mod types;

// Re-export key types for convenience
pub use config::{BarConfig, BufferConfig, TaproomConfig};
pub use error::{ConfigError, Error, OrderError, Result};
pub use id::RequesterId;
pub use types::{Order, OrderState};
