//! Response documentation built from `@return` and `@throws` tags.

use crate::annotation::Annotation;
use crate::error::{Error, Result};
use crate::expander::expand;
use crate::schema::{self, ModelResolver, SchemaFragment};
use crate::template::APPLICATION_JSON;
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

static CODE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@code +(\d+)").expect("code pattern is valid"));

/// Status code of a `@return` tag without `@code`
pub const DEFAULT_RETURN_CODE: &str = "200";

/// Status code of a `@throws` tag without `@code`
pub const DEFAULT_THROWS_CODE: &str = "500";

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// Tag description with `@code` and the bracket span removed
    pub description: String,
    /// Media types keyed by content type; only set for JSON responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<BTreeMap<String, MediaType>>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaType {
    /// Schema of the response body
    pub schema: SchemaFragment,
}

/// Splits an inline `@code <digits>` token off a description.
///
/// Returns the status code (or `default`) and the description without the token.
pub fn extract_code(description: &str, default: &str) -> (String, String) {
    match CODE_REGEX.captures(description) {
        Some(captures) => {
            let token = &captures[0];
            let code = captures[1].to_string();
            (code, description.replace(token, "").trim().to_string())
        }
        None => (default.to_string(), description.to_string()),
    }
}

/// Whether a declared return type is the JSON response marker type.
///
/// Matches on the last path segment, ignoring generic arguments, so `Json`,
/// `axum::Json` and `Json<Widget>` all match the marker `Json`.
pub fn is_json_response(type_name: &str, marker: &str) -> bool {
    let base = type_name.split('<').next().unwrap_or(type_name);
    schema::type_tail(base) == marker
}

/// Builds the response map of a route, keyed by status code.
///
/// # Errors
///
/// Returns [`Error::MultipleModelsWithoutArray`] when a `@return` declaration
/// lists more than one model inside single brackets.
pub fn build_responses(
    handler: &str,
    annotation: &Annotation,
    resolver: &mut ModelResolver<'_>,
    json_marker: &str,
) -> Result<BTreeMap<String, Response>> {
    let mut responses = BTreeMap::new();

    for ret in annotation.returns() {
        let (code, description) = extract_code(ret.description.trim(), DEFAULT_RETURN_CODE);
        let mut response = Response {
            description: description.clone(),
            content: None,
        };

        let mut models = Vec::new();
        let mut properties = Vec::new();
        let mut is_array = false;

        if let Some(expansion) = expand(&description) {
            is_array = expansion.is_array;
            response.description = expansion.summary().to_string();
            for field in expansion.fields() {
                if schema::is_primitive(&field.type_name) {
                    properties.push((field.name.clone(), SchemaFragment::property(field)));
                } else {
                    models.push(resolver.resolve(&field.type_name));
                }
            }
        }

        if models.len() > 1 && !is_array {
            return Err(Error::MultipleModelsWithoutArray {
                handler: handler.to_string(),
                code,
            });
        }

        let body = if !models.is_empty() {
            if models.len() == 1 {
                models.remove(0)
            } else {
                SchemaFragment::AnyOf(models)
            }
        } else if !properties.is_empty() {
            let object = SchemaFragment::Object {
                properties,
                required: Vec::new(),
            };
            if is_array {
                SchemaFragment::ArrayOf(Box::new(object))
            } else {
                object
            }
        } else {
            SchemaFragment::Empty
        };

        if is_json_response(&ret.type_name, json_marker) {
            let mut content = BTreeMap::new();
            content.insert(APPLICATION_JSON.to_string(), MediaType { schema: body });
            response.content = Some(content);
        } else {
            debug!("{}: {} is not a JSON response, content omitted", handler, ret.type_name);
        }

        responses.insert(code, response);
    }

    for throws in annotation.throws() {
        let (code, description) = extract_code(throws.description.trim(), DEFAULT_THROWS_CODE);
        responses
            .entry(code)
            .and_modify(|response: &mut Response| response.description = description.clone())
            .or_insert_with(|| Response {
                description,
                content: None,
            });
    }

    Ok(responses)
}
