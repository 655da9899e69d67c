//! Error types for the Taproom engine.
//!
//! Blocking operations never fail under a live system, so the only recoverable
//! errors are rejected configuration and malformed orders caught at the boundary.
//! The root error type, `Error`, wraps both.

use thiserror::Error;

/// Root error type for Taproom.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Order validation errors
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to construction-time configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A buffer must hold at least one item
    #[error("Buffer capacity must be greater than zero")]
    ZeroCapacity,

    /// The bar must admit at least one requester
    #[error("Maximum requester count must be greater than zero")]
    ZeroRequesters,

    /// The resource pool must contain at least one resource
    #[error("Resource pool size must be greater than zero")]
    ZeroPoolSize,

    /// Orders must be allowed at least one resource slot
    #[error("Maximum resources per order must be greater than zero")]
    ZeroResourcesPerOrder,

    /// The configuration source could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Errors raised when an order violates the caller contract.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderError {
    /// A requested resource lies outside `[1, pool_size]`
    #[error("Resource {resource} is outside the pool [1, {pool_size}]")]
    ResourceOutOfRange {
        /// The offending identifier
        resource: u32,
        /// Size of the pool the order was checked against
        pool_size: u32,
    },

    /// The order lists more resource slots than allowed
    #[error("Order requests {count} resource slots, at most {max} allowed")]
    TooManyResources {
        /// Number of slots in the request
        count: usize,
        /// Configured maximum
        max: usize,
    },
}

/// Result type used throughout Taproom.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let error: Error = ConfigError::ZeroCapacity.into();
        assert!(matches!(error, Error::Config(ConfigError::ZeroCapacity)));

        let error: Error = OrderError::TooManyResources { count: 4, max: 3 }.into();
        assert!(matches!(error, Error::Order(OrderError::TooManyResources { .. })));
    }

    #[test]
    fn test_error_display() {
        let error: Error = OrderError::ResourceOutOfRange {
            resource: 11,
            pool_size: 10,
        }
        .into();
        let display = format!("{}", error);
        assert!(display.contains("Resource 11 is outside the pool [1, 10]"));
    }
}
