//! Input documentation built from a handler's `@param` tags.
//!
//! Each `@param` tag declares its fields with the bracket mini-grammar. GET
//! routes document the fields as query parameters; every other method
//! documents them as a request body.

use crate::annotation::{Annotation, ParamTag};
use crate::error::{Error, Result};
use crate::expander::expand;
use crate::routes::HttpMethod;
use crate::schema::{self, ModelResolver, SchemaFragment};
use crate::template::{json_reference_template, merge_content, replace_key, url_encoded_template};
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location; always `query` for annotated GET fields
    #[serde(rename = "in")]
    pub location: String,
    /// Whether the field description contains `required `
    pub required: bool,
    /// Schema of the declared primitive type
    pub schema: SchemaFragment,
    /// Field description with `required` removed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Input documentation for one route.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterBlock {
    /// Query parameters of a GET route
    Query(Vec<Parameter>),
    /// Merged request body template of any other route
    Body(Value),
}

/// Builds the input documentation of a route.
///
/// Returns `Ok(None)` when no field was declared or none survived expansion.
///
/// # Errors
///
/// Returns [`Error::ArrayInputParameter`] when a `@param` declaration uses
/// double brackets.
pub fn build_parameters(
    method: HttpMethod,
    handler: &str,
    annotation: &Annotation,
    resolver: &mut ModelResolver<'_>,
) -> Result<Option<ParameterBlock>> {
    let mut fields: Vec<ParamTag> = Vec::new();

    for param in annotation.params() {
        let Some(expansion) = expand(&param.description) else {
            debug!("{}: @param {} declares no fields", handler, param.type_name);
            continue;
        };
        if expansion.is_array {
            return Err(Error::ArrayInputParameter {
                handler: handler.to_string(),
            });
        }
        fields.extend(expansion.fields().cloned());
    }

    if fields.is_empty() {
        return Ok(None);
    }

    if method == HttpMethod::Get {
        let parameters = fields.iter().map(query_parameter).collect();
        return Ok(Some(ParameterBlock::Query(parameters)));
    }

    Ok(request_body(handler, &fields, resolver).map(ParameterBlock::Body))
}

fn query_parameter(field: &ParamTag) -> Parameter {
    Parameter {
        name: field.name.clone(),
        location: "query".to_string(),
        required: field.description.contains("required "),
        schema: SchemaFragment::Primitive {
            json_type: schema::json_type(&field.type_name).to_string(),
            description: None,
        },
        description: schema::render_description(&field.description),
    }
}

fn request_body(
    handler: &str,
    fields: &[ParamTag],
    resolver: &mut ModelResolver<'_>,
) -> Option<Value> {
    let mut properties = Vec::new();
    let mut required = Vec::new();
    let mut model: Option<String> = None;

    for field in fields {
        if schema::is_primitive(&field.type_name) {
            if schema::is_required(&field.description) {
                required.push(field.name.clone());
            }
            properties.push((field.name.clone(), SchemaFragment::property(field)));
        } else {
            let reference = resolver.reference(&field.type_name);
            if let Some(previous) = model.replace(reference) {
                warn!("{}: request body declares several models, {} is replaced", handler, previous);
            }
        }
    }

    let mut body = None;

    if !properties.is_empty() {
        let object = SchemaFragment::Object {
            properties,
            required,
        };
        body = Some(replace_key(&url_encoded_template(), "schema", &object.to_value()));
    }

    if let Some(model) = model {
        let reference = replace_key(&json_reference_template(), "$ref", &Value::String(model));
        match body.as_mut() {
            Some(body) => merge_content(body, &reference),
            None => body = Some(reference),
        }
    }

    body
}
