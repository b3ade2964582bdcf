//! Annotation parser for handler doc comments.
//!
//! A doc comment is split into a summary (its first paragraph) and a list of
//! tags. Tags start at the beginning of a line with `@name`; following lines
//! that do not start a new tag continue the previous tag's text.
//!
//! ```text
//! Creates a widget.
//!
//! @param Body $input [string $name required The widget name, int $size]
//! @return Json Created [int $id] @code 201
//! @throws ValidationError @code 422 Invalid input
//! ```
//!
//! Only `param`, `return` and `throws` tags are kept. Every kept tag needs a
//! type; a top-level `param` tag may leave out its `$name`, a bracket field
//! may not. Anything else makes the whole comment unparseable.

use log::debug;
use thiserror::Error;

/// A parsed handler annotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotation {
    /// First paragraph of the comment, lines joined with single spaces
    pub summary: String,
    /// Recognised tags in declaration order
    pub tags: Vec<Tag>,
}

/// A recognised annotation tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tag {
    /// `@param <type> $<name> [description]`
    Param(ParamTag),
    /// `@return <type> [description]`
    Return(TypedTag),
    /// `@throws <type> [description]`
    Throws(TypedTag),
}

/// A declared parameter or, inside an expansion, a declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamTag {
    /// Declared type, a primitive kind or a model path
    pub type_name: String,
    /// Name without the leading `$`; empty when a top-level tag names no variable
    pub name: String,
    /// Free text after the name, including any bracket declaration
    pub description: String,
}

/// A `return` or `throws` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedTag {
    /// Declared return or error type
    pub type_name: String,
    /// Free text after the type, including `@code` and bracket declarations
    pub description: String,
}

/// Why a doc comment could not be turned into an [`Annotation`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnnotationError {
    #[error("doc comment is empty")]
    Empty,

    #[error("malformed @{tag} tag: {body:?}")]
    MalformedTag { tag: String, body: String },
}

impl Annotation {
    /// Parses raw doc comment text.
    pub fn parse(text: &str) -> Result<Self, AnnotationError> {
        Self::parse_with(text, false)
    }

    /// Parses bracket field declarations, where every `param` tag must name a `$variable`.
    pub(crate) fn parse_fields(text: &str) -> Result<Self, AnnotationError> {
        Self::parse_with(text, true)
    }

    fn parse_with(text: &str, require_variable: bool) -> Result<Self, AnnotationError> {
        let mut summary_lines: Vec<&str> = Vec::new();
        let mut summary_closed = false;
        let mut raw_tags: Vec<(String, String)> = Vec::new();

        for line in text.lines().map(clean_line) {
            if let Some(rest) = line.strip_prefix('@') {
                let (name, body) = split_token(rest);
                if !is_tag_name(name) {
                    return Err(AnnotationError::MalformedTag {
                        tag: name.to_string(),
                        body: body.to_string(),
                    });
                }
                raw_tags.push((name.to_string(), body.to_string()));
            } else if let Some((_, body)) = raw_tags.last_mut() {
                if !line.is_empty() {
                    if !body.is_empty() {
                        body.push(' ');
                    }
                    body.push_str(line);
                }
            } else if line.is_empty() {
                summary_closed |= !summary_lines.is_empty();
            } else if !summary_closed {
                summary_lines.push(line);
            }
        }

        if summary_lines.is_empty() && raw_tags.is_empty() {
            return Err(AnnotationError::Empty);
        }

        let mut tags = Vec::with_capacity(raw_tags.len());
        for (name, body) in raw_tags {
            let tag = match name.as_str() {
                "param" => Tag::Param(parse_param(&body, require_variable)?),
                "return" => Tag::Return(parse_typed(&name, &body)?),
                "throws" => Tag::Throws(parse_typed(&name, &body)?),
                _ => {
                    debug!("Ignoring @{} tag", name);
                    continue;
                }
            };
            tags.push(tag);
        }

        Ok(Self {
            summary: summary_lines.join(" "),
            tags,
        })
    }

    /// All `@param` tags in declaration order
    pub fn params(&self) -> impl Iterator<Item = &ParamTag> {
        self.tags.iter().filter_map(|tag| match tag {
            Tag::Param(param) => Some(param),
            _ => None,
        })
    }

    /// All `@return` tags in declaration order
    pub fn returns(&self) -> impl Iterator<Item = &TypedTag> {
        self.tags.iter().filter_map(|tag| match tag {
            Tag::Return(ret) => Some(ret),
            _ => None,
        })
    }

    /// All `@throws` tags in declaration order
    pub fn throws(&self) -> impl Iterator<Item = &TypedTag> {
        self.tags.iter().filter_map(|tag| match tag {
            Tag::Throws(throws) => Some(throws),
            _ => None,
        })
    }
}

/// Strips comment decoration (`/**`, `*/`, leading `*`) and surrounding whitespace.
fn clean_line(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_prefix("/**").unwrap_or(line);
    let line = line.strip_suffix("*/").unwrap_or(line).trim();
    line.strip_prefix('*').map(str::trim).unwrap_or(line)
}

/// Splits off the first whitespace-delimited token; the remainder is trimmed.
fn split_token(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.find(char::is_whitespace) {
        Some(idx) => (&text[..idx], text[idx..].trim()),
        None => (text, ""),
    }
}

fn is_tag_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn is_type_name(name: &str) -> bool {
    name.chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '\\')
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '\\' | ':' | '<' | '>' | '|'))
}

fn is_variable_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

fn parse_param(body: &str, require_variable: bool) -> Result<ParamTag, AnnotationError> {
    let malformed = || AnnotationError::MalformedTag {
        tag: "param".to_string(),
        body: body.to_string(),
    };

    let (type_name, rest) = split_token(body);
    if !is_type_name(type_name) {
        return Err(malformed());
    }
    let (variable, description) = split_token(rest);
    let Some(name) = variable.strip_prefix('$') else {
        if require_variable {
            return Err(malformed());
        }
        return Ok(ParamTag {
            type_name: type_name.to_string(),
            name: String::new(),
            description: rest.to_string(),
        });
    };
    if !is_variable_name(name) {
        return Err(malformed());
    }

    Ok(ParamTag {
        type_name: type_name.to_string(),
        name: name.to_string(),
        description: description.to_string(),
    })
}

fn parse_typed(tag: &str, body: &str) -> Result<TypedTag, AnnotationError> {
    let (type_name, description) = split_token(body);
    if !is_type_name(type_name) {
        return Err(AnnotationError::MalformedTag {
            tag: tag.to_string(),
            body: body.to_string(),
        });
    }
    Ok(TypedTag {
        type_name: type_name.to_string(),
        description: description.to_string(),
    })
}
