//! Route table.

use crate::{Error, Handler, Result};
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Exact-match mapping from message type to handler.
pub struct RouteTable<S> {
    routes: HashMap<String, Box<dyn Handler<S>>>,
}

impl<S> RouteTable<S> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Binds `handler` to `msg_type`.
    ///
    /// Fails without touching the table if `msg_type` is not purely
    /// alphabetic or is already bound. Returns the table for chaining.
    pub fn register<H>(&mut self, msg_type: &str, handler: H) -> Result<&mut Self>
    where
        H: Handler<S> + 'static,
    {
        if !is_valid_route(msg_type) {
            return Err(Error::InvalidRouteExpression(msg_type.to_string()));
        }
        if self.routes.contains_key(msg_type) {
            return Err(Error::DuplicateRoute(msg_type.to_string()));
        }

        debug!(route = msg_type, "registered route");
        self.routes.insert(msg_type.to_string(), Box::new(handler));
        Ok(self)
    }

    /// Handler bound to exactly `msg_type`. `None` means not found.
    pub fn route(&self, msg_type: &str) -> Option<&dyn Handler<S>> {
        self.routes.get(msg_type).map(|h| h.as_ref())
    }

    /// Checks if `msg_type` is bound
    pub fn contains(&self, msg_type: &str) -> bool {
        self.routes.contains_key(msg_type)
    }

    /// Number of routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Checks if no routes are registered
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Registered message types, sorted.
    pub fn routes(&self) -> Vec<&str> {
        let mut routes: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        routes.sort_unstable();
        routes
    }
}

impl<S> Default for RouteTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for RouteTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteTable")
            .field("routes", &self.routes())
            .finish()
    }
}

fn is_valid_route(msg_type: &str) -> bool {
    !msg_type.is_empty() && msg_type.chars().all(|c| c.is_ascii_alphabetic())
}
