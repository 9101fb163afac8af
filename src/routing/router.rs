//! Route registration and lookup.
//!
//! # Responsibilities
//! - Compile templates once at registration
//! - Store routes per HTTP method in registration order
//! - Resolve (method, path) to a handler plus path parameters
//!
//! # Design Decisions
//! - Built through `RouterBuilder`, frozen into an immutable `Router`
//! - First registered match wins; there is no best-match scoring
//! - Explicit `None` for no match rather than a default route

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::app::handler::{Handler, SharedHandler};
use crate::routing::matcher::{PathTemplate, RouteError};

/// A compiled route entry.
pub struct Route {
    method: String,
    template: PathTemplate,
    handler: SharedHandler,
}

impl Route {
    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    pub fn handler(&self) -> &SharedHandler {
        &self.handler
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("template", &self.template.as_str())
            .finish_non_exhaustive()
    }
}

/// Result of a successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: HashMap<String, String>,
}

/// Collects routes before the server starts.
#[derive(Debug, Default)]
pub struct RouterBuilder {
    routes: HashMap<String, Vec<Route>>,
    count: usize,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `method` and `template`.
    pub fn route<H: Handler>(
        mut self,
        method: &str,
        template: &str,
        handler: H,
    ) -> Result<Self, RouteError> {
        let template = PathTemplate::parse(template)?;
        tracing::debug!(method = %method, template = %template, "Added route");

        self.routes.entry(method.to_string()).or_default().push(Route {
            method: method.to_string(),
            template,
            handler: Arc::new(handler),
        });
        self.count += 1;
        Ok(self)
    }

    pub fn get<H: Handler>(self, template: &str, handler: H) -> Result<Self, RouteError> {
        self.route("GET", template, handler)
    }

    pub fn post<H: Handler>(self, template: &str, handler: H) -> Result<Self, RouteError> {
        self.route("POST", template, handler)
    }

    pub fn put<H: Handler>(self, template: &str, handler: H) -> Result<Self, RouteError> {
        self.route("PUT", template, handler)
    }

    pub fn patch<H: Handler>(self, template: &str, handler: H) -> Result<Self, RouteError> {
        self.route("PATCH", template, handler)
    }

    pub fn delete<H: Handler>(self, template: &str, handler: H) -> Result<Self, RouteError> {
        self.route("DELETE", template, handler)
    }

    /// Freeze the table.
    pub fn build(self) -> Router {
        Router {
            routes: self.routes,
            count: self.count,
        }
    }
}

/// Immutable route table, shared across connections without locking.
#[derive(Debug, Default)]
pub struct Router {
    routes: HashMap<String, Vec<Route>>,
    count: usize,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Find the first route registered for `method` whose template matches `path`.
    pub fn resolve(&self, method: &str, path: &str) -> Option<RouteMatch<'_>> {
        self.routes.get(method)?.iter().find_map(|route| {
            route
                .template
                .matches(path)
                .map(|params| RouteMatch { route, params })
        })
    }

    /// Total number of registered routes.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
