//! Route source: the registered routes the compiler documents.
//!
//! Routes come from a manifest file (YAML or JSON) listing each route's URI,
//! HTTP method, handler id and guarding middleware:
//!
//! ```yaml
//! - uri: /api/v1/widgets
//!   method: POST
//!   handler: WidgetController::store
//!   middleware: [api.keys]
//! ```

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// A single registered route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    /// The URI pattern exactly as registered (e.g. "/api/v1/widgets/{id}")
    pub uri: String,
    /// The HTTP method
    pub method: HttpMethod,
    /// Handler reference, `Type::method` or a free function path
    pub handler: String,
    /// Names of middleware guarding the route, in registration order
    #[serde(default)]
    pub middleware: Vec<String>,
}

/// HTTP methods a route can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
}

impl HttpMethod {
    /// Upper-case method name as used in route registration
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RouteDescriptor {
    /// Create a route with no middleware
    pub fn new(uri: impl Into<String>, method: HttpMethod, handler: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            method,
            handler: handler.into(),
            middleware: Vec::new(),
        }
    }

    /// Attach middleware names to the route
    pub fn with_middleware<I, S>(mut self, middleware: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.middleware = middleware.into_iter().map(Into::into).collect();
        self
    }
}

/// Loads the route manifest at `path`.
///
/// Files ending in `.json` are read as JSON, everything else as YAML.
pub fn load_routes(path: &Path) -> Result<Vec<RouteDescriptor>> {
    debug!("Loading route manifest: {}", path.display());

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read route manifest: {}", path.display()))?;

    let routes: Vec<RouteDescriptor> = if path.extension().and_then(|s| s.to_str()) == Some("json") {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse route manifest: {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse route manifest: {}", path.display()))?
    };

    debug!("Loaded {} routes", routes.len());
    Ok(routes)
}
