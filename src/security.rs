//! Security requirements derived from route middleware.

use crate::openapi_builder::GroupContext;
use crate::routes::{HttpMethod, RouteDescriptor};
use std::collections::BTreeMap;

/// One OpenAPI security requirement: scheme name to required scopes
pub type SecurityRequirement = BTreeMap<String, Vec<String>>;

/// Scope implied by an HTTP method, if any.
pub fn scope_for(method: HttpMethod) -> Option<&'static str> {
    match method {
        HttpMethod::Get => Some("read"),
        HttpMethod::Post => Some("write"),
        HttpMethod::Put => Some("update"),
        HttpMethod::Delete => Some("delete"),
        _ => None,
    }
}

/// Builds the security requirements of a route, one per middleware.
///
/// Every middleware name is recorded in `context.used_schemes` so the
/// assembler can copy its scheme definition. `context.referenced_security`
/// keeps only the last middleware per URI.
pub fn resolve_security(
    route: &RouteDescriptor,
    context: &mut GroupContext,
) -> Vec<SecurityRequirement> {
    let scopes: Vec<String> = scope_for(route.method)
        .map(|scope| vec![scope.to_string()])
        .unwrap_or_default();

    route
        .middleware
        .iter()
        .map(|middleware| {
            context
                .used_schemes
                .entry(middleware.clone())
                .or_insert_with(|| route.uri.clone());
            context
                .referenced_security
                .insert(route.uri.clone(), middleware.clone());
            let mut requirement = SecurityRequirement::new();
            requirement.insert(middleware.clone(), scopes.clone());
            requirement
        })
        .collect()
}
