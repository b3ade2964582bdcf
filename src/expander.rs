//! Bracket mini-grammar expansion.
//!
//! A tag description may embed a list of field declarations in brackets:
//! `"Creates a widget [string $name, int $size]"`. Doubling the brackets,
//! `"[[string $name, int $size]]"`, marks the fields as the items of an array.
//! Each comma-separated token uses the `@param` syntax (`type $name description`).

use crate::annotation::{Annotation, ParamTag};
use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

static BRACKET_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(.*)\]").expect("bracket pattern is valid"));

/// Field declarations recovered from a bracketed description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// Synthetic annotation holding one `param` tag per declared field
    pub annotation: Annotation,
    /// Whether the declaration used double brackets
    pub is_array: bool,
}

impl Expansion {
    /// The description with the bracket span removed
    pub fn summary(&self) -> &str {
        &self.annotation.summary
    }

    /// Declared fields in order
    pub fn fields(&self) -> impl Iterator<Item = &ParamTag> {
        self.annotation.params()
    }
}

/// Expands the first bracket span of `description`.
///
/// Returns `None` when there is no span or when a token does not follow the
/// `type $name description` shape.
pub fn expand(description: &str) -> Option<Expansion> {
    let captures = BRACKET_REGEX.captures(description)?;
    let span = captures.get(0)?.as_str();
    let mut inner = captures.get(1)?.as_str();

    let is_array = inner.starts_with('[') && inner.ends_with(']') && inner.len() >= 2;
    if is_array {
        inner = &inner[1..inner.len() - 1];
    }

    let summary = description.replacen(span, "", 1);
    let summary = summary.trim();

    let mut synthetic = String::new();
    if !summary.is_empty() {
        synthetic.push_str(summary);
        synthetic.push('\n');
    }
    for token in inner.split(',') {
        synthetic.push_str("@param ");
        synthetic.push_str(token.trim());
        synthetic.push('\n');
    }
    synthetic.push_str("@return void");

    match Annotation::parse_fields(&synthetic) {
        Ok(annotation) => Some(Expansion {
            annotation,
            is_array,
        }),
        Err(e) => {
            debug!("Skipping bracket declaration {:?}: {}", span, e);
            None
        }
    }
}
