use crate::config::{Contact, GroupConfig, Server, Tag};
use crate::error::{Error, Result};
use crate::parameters::Parameter;
use crate::responses::Response;
use crate::routes::HttpMethod;
use crate::security::SecurityRequirement;
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// OpenAPI version written to every document
pub const OPENAPI_VERSION: &str = "3.0.0";

/// Cross-route state of one path-group run.
///
/// A fresh context is created before the first route of a group is processed
/// and consumed when the group's document is built.
#[derive(Debug, Clone, Default)]
pub struct GroupContext {
    /// Model reference path -> import path of the model, when one was found
    pub referenced_models: BTreeMap<String, Option<String>>,
    /// Route URI -> security scheme name guarding it, last middleware wins
    pub referenced_security: BTreeMap<String, String>,
    /// Every security scheme used by an operation -> URI of the first route using it
    pub used_schemes: BTreeMap<String, String>,
}

/// OpenAPI document builder for one path-group
pub struct OpenApiBuilder {
    info: Info,
    servers: Vec<Server>,
    tags: Vec<Tag>,
    /// Paths collection (URI -> PathItem)
    paths: BTreeMap<String, PathItem>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// Contact information
    pub contact: Contact,
    /// API version
    pub version: String,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PathItem {
    /// GET operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// POST operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// PUT operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// DELETE operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    /// PATCH operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    /// OPTIONS operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    /// HEAD operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
}

impl PathItem {
    /// Operation registered for `method`, if any
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
        }
    }

    fn set(&mut self, method: HttpMethod, operation: Operation) {
        let slot = match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
        };
        *slot = Some(operation);
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Operation {
    /// Handler id of the route
    #[serde(rename = "operationId")]
    pub operation_id: String,
    /// Handler summary; only present together with parameters or a request body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Query parameters of a GET route
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    /// Request body merged from the body templates
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
    /// Responses keyed by status code
    pub responses: BTreeMap<String, Response>,
    /// One requirement per middleware guarding the route
    pub security: Vec<SecurityRequirement>,
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Components {
    /// Definitions of the security schemes used by the group's operations
    #[serde(rename = "securitySchemes", skip_serializing_if = "BTreeMap::is_empty")]
    pub security_schemes: BTreeMap<String, Value>,
}

/// Complete OpenAPI document for one path-group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API metadata
    pub info: Info,
    /// Server list copied from the group configuration
    pub servers: Vec<Server>,
    /// Tag list copied from the group configuration
    pub tags: Vec<Tag>,
    /// Available paths and operations, ordered by URI
    pub paths: BTreeMap<String, PathItem>,
    /// Security scheme definitions, omitted when no operation uses one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

impl OpenApiBuilder {
    /// Create a builder seeded with the group's metadata
    pub fn new(config: &GroupConfig) -> Self {
        debug!("Initializing OpenApiBuilder for {}", config.title);
        Self {
            info: Info {
                title: config.title.clone(),
                contact: config.contact.clone(),
                version: config.api_version.clone(),
            },
            servers: config.servers.clone(),
            tags: config.tags.clone(),
            paths: BTreeMap::new(),
        }
    }

    /// Add an operation; a later operation for the same URI and method replaces the earlier one
    pub fn add_operation(&mut self, uri: &str, method: HttpMethod, operation: Operation) {
        debug!("Adding operation: {} {}", method, uri);
        self.paths
            .entry(uri.to_string())
            .or_default()
            .set(method, operation);
    }

    /// Number of distinct URIs documented so far
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    /// Build the final OpenAPI document.
    ///
    /// Every security scheme used by an operation must be defined in
    /// `security`; its definition is copied into `components.securitySchemes`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingSecurityScheme`] for the first referenced scheme
    /// without a definition.
    pub fn build(
        self,
        context: GroupContext,
        security: &BTreeMap<String, Value>,
    ) -> Result<OpenApiDocument> {
        debug!("Building final OpenAPI document");

        if !context.referenced_models.is_empty() {
            let models: Vec<&str> = context
                .referenced_models
                .keys()
                .map(|reference| reference.trim_start_matches(crate::schema::SCHEMA_REF_PREFIX))
                .collect();
            warn!(
                "Model schemas are not generated yet, components.schemas stays empty (referenced: {})",
                models.join(", ")
            );
        }

        let mut security_schemes = BTreeMap::new();
        for (path, scheme) in context
            .referenced_security
            .iter()
            .chain(context.used_schemes.iter().map(|(scheme, path)| (path, scheme)))
        {
            let definition = security.get(scheme).ok_or_else(|| Error::MissingSecurityScheme {
                scheme: scheme.clone(),
                path: path.clone(),
            })?;
            security_schemes.insert(scheme.clone(), definition.clone());
        }

        let components = if security_schemes.is_empty() {
            None
        } else {
            Some(Components { security_schemes })
        };

        Ok(OpenApiDocument {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info,
            servers: self.servers,
            tags: self.tags,
            paths: self.paths,
            components,
        })
    }
}
