//! Path-group compilation: route filtering and the per-route pipeline.
//!
//! For each configured prefix the compiler selects the matching routes, turns
//! every documented handler into an [`Operation`] and assembles the group's
//! document. A fatal error aborts only the group it occurred in.

use crate::annotation::Annotation;
use crate::comment_source::CommentSource;
use crate::config::{Config, GroupConfig};
use crate::error::{Error, Result};
use crate::openapi_builder::{GroupContext, OpenApiBuilder, OpenApiDocument, Operation};
use crate::parameters::{build_parameters, ParameterBlock};
use crate::responses::build_responses;
use crate::routes::RouteDescriptor;
use crate::schema::ModelResolver;
use crate::security::resolve_security;
use crate::serializer::DocumentSink;
use log::{debug, error, info, warn};

/// Routes whose URI contains `prefix`, in their original order.
pub fn filter_routes<'a>(routes: &'a [RouteDescriptor], prefix: &str) -> Vec<&'a RouteDescriptor> {
    routes.iter().filter(|route| route.uri.contains(prefix)).collect()
}

/// Outcome of compiling every configured group
#[derive(Debug, Default)]
pub struct CompileReport {
    /// Prefixes whose document was written
    pub written: Vec<String>,
    /// Prefixes that failed, with the error that aborted them
    pub failed: Vec<(String, Error)>,
}

impl CompileReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Compiles route annotations into one OpenAPI document per path-group.
pub struct Compiler<'a> {
    routes: &'a [RouteDescriptor],
    comments: &'a dyn CommentSource,
}

impl<'a> Compiler<'a> {
    pub fn new(routes: &'a [RouteDescriptor], comments: &'a dyn CommentSource) -> Self {
        Self { routes, comments }
    }

    /// Builds the document of the group configured under `prefix`.
    ///
    /// # Errors
    ///
    /// Any annotation or security error of a route in the group aborts it.
    pub fn compile_group(&self, prefix: &str, config: &GroupConfig) -> Result<OpenApiDocument> {
        let mut context = GroupContext::default();
        let mut builder = OpenApiBuilder::new(config);

        let routes = filter_routes(self.routes, prefix);
        debug!("{} routes match prefix {}", routes.len(), prefix);

        for route in routes {
            if let Some(operation) = self.compile_route(route, config, &mut context)? {
                builder.add_operation(&route.uri, route.method, operation);
            }
        }

        info!("Documented {} paths for {}", builder.path_count(), prefix);
        builder.build(context, &config.security)
    }

    fn compile_route(
        &self,
        route: &RouteDescriptor,
        config: &GroupConfig,
        context: &mut GroupContext,
    ) -> Result<Option<Operation>> {
        let Some(doc) = self.comments.doc_comment(&route.handler) else {
            debug!("Skipping {} {}: {} has no doc comment", route.method, route.uri, route.handler);
            return Ok(None);
        };

        let annotation = match Annotation::parse(&doc) {
            Ok(annotation) => annotation,
            Err(e) => {
                warn!("Skipping {} {}: {}", route.method, route.uri, e);
                return Ok(None);
            }
        };

        let mut resolver = ModelResolver::new(
            self.comments.declaring_source(&route.handler),
            &mut context.referenced_models,
        );

        let mut operation = Operation {
            operation_id: route.handler.clone(),
            description: None,
            parameters: None,
            request_body: None,
            responses: Default::default(),
            security: Vec::new(),
        };

        if let Some(block) = build_parameters(route.method, &route.handler, &annotation, &mut resolver)? {
            if !annotation.summary.is_empty() {
                operation.description = Some(annotation.summary.clone());
            }
            match block {
                ParameterBlock::Query(parameters) => operation.parameters = Some(parameters),
                ParameterBlock::Body(body) => operation.request_body = Some(body),
            }
        }

        operation.responses = build_responses(
            &route.handler,
            &annotation,
            &mut resolver,
            &config.json_response_type,
        )?;
        operation.security = resolve_security(route, context);

        Ok(Some(operation))
    }

    /// Compiles every configured group and hands each document to `sink`.
    ///
    /// Groups run in ascending prefix order and independently of each other.
    pub fn compile_all(&self, config: &Config, sink: &mut dyn DocumentSink) -> CompileReport {
        let mut report = CompileReport::default();

        for (prefix, group) in &config.groups {
            info!("Compiling {} ({})", prefix, group.title);
            let result = self
                .compile_group(prefix, group)
                .and_then(|document| sink.write(prefix, group, &document));

            match result {
                Ok(()) => report.written.push(prefix.clone()),
                Err(e) => {
                    if e.is_input_error() {
                        error!("Skipping {}: {}", prefix, e);
                    } else {
                        error!("Failed to write {}: {}", prefix, e);
                    }
                    report.failed.push((prefix.clone(), e));
                }
            }
        }

        report
    }
}
