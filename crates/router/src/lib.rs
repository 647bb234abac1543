//! Message routing.
//!
//! A [`RouteTable`] binds each message type to exactly one [`Handler`]. The
//! table is built once before any transaction is processed and is read-only
//! afterwards.

pub mod handler;
pub mod table;

pub use handler::{Handler, HandlerError, HandlerOutput};
pub use table::RouteTable;

use thiserror::Error;

/// Result type for route registration
pub type Result<T> = std::result::Result<T, Error>;

/// Route registration errors. Both are start-up configuration defects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Route keys must be purely alphabetic
    #[error("Invalid route expression: {0:?}")]
    InvalidRouteExpression(String),

    /// A handler is already bound to this message type
    #[error("Duplicate route: {0}")]
    DuplicateRoute(String),
}
