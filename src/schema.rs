use crate::annotation::ParamTag;
use log::debug;
use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use syn::{Item, UseTree};

/// Declared type names rendered inline instead of as a model reference
pub const PRIMITIVE_TYPES: [&str; 5] = ["int", "float", "string", "boolean", "array"];

/// Prefix of every model reference path
pub const SCHEMA_REF_PREFIX: &str = "#/components/schemas/";

/// A JSON-Schema fragment computed from declared types.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaFragment {
    /// `{"type": <json_type>, "description"?: ...}`
    Primitive {
        json_type: String,
        description: Option<String>,
    },
    /// `{"$ref": "#/components/schemas/<name>"}`
    ModelRef(String),
    /// `{"type": "object", "properties": {...}, "required"?: [...]}`
    Object {
        properties: Vec<(String, SchemaFragment)>,
        required: Vec<String>,
    },
    /// `{"type": "array", "items": ...}`
    ArrayOf(Box<SchemaFragment>),
    /// `{"anyOf": [...]}`
    AnyOf(Vec<SchemaFragment>),
    /// `{}`
    Empty,
}

impl SchemaFragment {
    /// Property schema for a primitive-typed field, with `required` removed from its description
    pub fn property(field: &ParamTag) -> Self {
        SchemaFragment::Primitive {
            json_type: json_type(&field.type_name).to_string(),
            description: render_description(&field.description),
        }
    }

    /// Converts the fragment into a JSON value, keeping property order.
    pub fn to_value(&self) -> Value {
        match self {
            SchemaFragment::Primitive {
                json_type,
                description,
            } => {
                let mut map = Map::new();
                map.insert("type".to_string(), Value::String(json_type.clone()));
                if let Some(description) = description {
                    map.insert("description".to_string(), Value::String(description.clone()));
                }
                Value::Object(map)
            }
            SchemaFragment::ModelRef(reference) => json!({ "$ref": reference }),
            SchemaFragment::Object {
                properties,
                required,
            } => {
                let properties: Map<String, Value> = properties
                    .iter()
                    .map(|(name, schema)| (name.clone(), schema.to_value()))
                    .collect();
                let mut map = Map::new();
                map.insert("type".to_string(), json!("object"));
                map.insert("properties".to_string(), Value::Object(properties));
                if !required.is_empty() {
                    map.insert("required".to_string(), json!(required));
                }
                Value::Object(map)
            }
            SchemaFragment::ArrayOf(items) => json!({
                "type": "array",
                "items": items.to_value(),
            }),
            SchemaFragment::AnyOf(items) => json!({
                "anyOf": items.iter().map(SchemaFragment::to_value).collect::<Vec<_>>(),
            }),
            SchemaFragment::Empty => Value::Object(Map::new()),
        }
    }
}

impl Serialize for SchemaFragment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// Whether `type_name` is one of the inline primitive kinds
pub fn is_primitive(type_name: &str) -> bool {
    PRIMITIVE_TYPES.contains(&type_name)
}

/// JSON type for a declared primitive; only `int` is renamed.
pub fn json_type(type_name: &str) -> &str {
    if type_name == "int" {
        "integer"
    } else {
        type_name
    }
}

/// Whether a field description marks the field as required.
pub fn is_required(description: &str) -> bool {
    description.contains("required")
}

/// Description with the word `required` removed, or `None` when nothing is left.
pub fn render_description(description: &str) -> Option<String> {
    let rendered = description.replace("required", "");
    let rendered = rendered.trim();
    if rendered.is_empty() {
        None
    } else {
        Some(rendered.to_string())
    }
}

/// Last `::` or `\` separated segment of a type name
pub fn type_tail(type_name: &str) -> &str {
    type_name
        .rsplit(|c: char| c == ':' || c == '\\')
        .next()
        .unwrap_or(type_name)
}

/// Reference path for a model type
pub fn schema_ref(type_name: &str) -> String {
    format!("{}{}", SCHEMA_REF_PREFIX, type_tail(type_name))
}

/// An import visible in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Name the import is visible under (the alias for `as` renames)
    pub visible: String,
    /// Full imported path, segments joined with `::`
    pub path: String,
}

/// Collects the `use` imports of a source file, including those of inline modules.
///
/// Returns an empty list when the source does not parse.
pub fn collect_imports(source: &str) -> Vec<Import> {
    let file = match syn::parse_file(source) {
        Ok(file) => file,
        Err(e) => {
            debug!("Declaring source does not parse, no imports resolved: {}", e);
            return Vec::new();
        }
    };

    let mut imports = Vec::new();
    collect_items(&file.items, &mut imports);
    imports
}

fn collect_items(items: &[Item], imports: &mut Vec<Import>) {
    for item in items {
        match item {
            Item::Use(use_item) => collect_use_tree(&use_item.tree, &mut Vec::new(), imports),
            Item::Mod(module) => {
                if let Some((_, items)) = &module.content {
                    collect_items(items, imports);
                }
            }
            _ => {}
        }
    }
}

/// Recursively flatten a use tree into full paths
fn collect_use_tree(tree: &UseTree, prefix: &mut Vec<String>, imports: &mut Vec<Import>) {
    match tree {
        UseTree::Path(path) => {
            prefix.push(path.ident.to_string());
            collect_use_tree(&path.tree, prefix, imports);
            prefix.pop();
        }
        UseTree::Name(name) => {
            let ident = name.ident.to_string();
            if ident == "self" {
                if let Some(last) = prefix.last() {
                    imports.push(Import {
                        visible: last.clone(),
                        path: prefix.join("::"),
                    });
                }
            } else {
                imports.push(Import {
                    path: joined(prefix, &ident),
                    visible: ident,
                });
            }
        }
        UseTree::Rename(rename) => {
            imports.push(Import {
                visible: rename.rename.to_string(),
                path: joined(prefix, &rename.ident.to_string()),
            });
        }
        UseTree::Group(group) => {
            for item in &group.items {
                collect_use_tree(item, prefix, imports);
            }
        }
        UseTree::Glob(_) => {}
    }
}

fn joined(prefix: &[String], last: &str) -> String {
    if prefix.is_empty() {
        last.to_string()
    } else {
        format!("{}::{}", prefix.join("::"), last)
    }
}

/// Turns model type names into schema references and records where each model is defined.
///
/// One resolver is created per route; it writes into the group-wide model map.
pub struct ModelResolver<'a> {
    imports: Vec<Import>,
    models: &'a mut BTreeMap<String, Option<String>>,
}

impl<'a> ModelResolver<'a> {
    /// Create a resolver over the handler's declaring source text
    pub fn new(
        declaring_source: Option<&str>,
        models: &'a mut BTreeMap<String, Option<String>>,
    ) -> Self {
        let imports = declaring_source.map(collect_imports).unwrap_or_default();
        Self { imports, models }
    }

    /// Resolves a model type to a `$ref` fragment, recording its import path.
    pub fn resolve(&mut self, type_name: &str) -> SchemaFragment {
        SchemaFragment::ModelRef(self.reference(type_name))
    }

    /// Resolves a model type to its reference path, recording its import path.
    pub fn reference(&mut self, type_name: &str) -> String {
        let reference = schema_ref(type_name);
        let tail = type_tail(type_name);

        let origin = self
            .imports
            .iter()
            .find(|import| import.visible == tail)
            .map(|import| import.path.clone())
            .or_else(|| (tail != type_name).then(|| type_name.to_string()));

        debug!("Model {} resolved to {} (import: {:?})", type_name, reference, origin);

        let entry = self.models.entry(reference.clone()).or_insert(None);
        if entry.is_none() {
            *entry = origin;
        }
        reference
    }
}
