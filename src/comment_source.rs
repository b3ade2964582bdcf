//! Comment source: doc comments and declaring files of route handlers.
//!
//! [`SourceIndex`] walks a source tree, parses every `.rs` file with `syn` and
//! indexes free functions by name and impl methods by `Type::method`,
//! descending into inline modules.
//!
//! # Example
//!
//! ```no_run
//! use openapi_from_annotations::comment_source::{CommentSource, SourceIndex};
//! use std::path::Path;
//!
//! let index = SourceIndex::scan(Path::new("./src")).unwrap();
//! if let Some(doc) = index.doc_comment("WidgetController::store") {
//!     println!("{}", doc);
//! }
//! ```

use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use syn::{Attribute, Expr, ImplItem, Item, Lit, Meta, Type};
use walkdir::WalkDir;

/// Lookup of handler documentation by handler id.
pub trait CommentSource {
    /// Raw doc comment text of the handler, or `None` when it has none or is unknown
    fn doc_comment(&self, handler: &str) -> Option<String>;

    /// Full source text of the file declaring the handler
    fn declaring_source(&self, handler: &str) -> Option<&str>;
}

#[derive(Debug, Clone)]
struct HandlerEntry {
    doc: Option<String>,
    file: PathBuf,
}

/// Index of handler doc comments built from Rust source files.
#[derive(Debug, Default)]
pub struct SourceIndex {
    handlers: HashMap<String, HandlerEntry>,
    sources: HashMap<PathBuf, String>,
}

impl SourceIndex {
    /// Scans `root` recursively and indexes every parseable `.rs` file.
    ///
    /// Hidden directories and `target` are skipped. Files that cannot be read
    /// or parsed are logged and left out.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not an accessible directory.
    pub fn scan(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            anyhow::bail!("Source path is not a directory: {}", root.display());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.path() == root {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            })
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("rs") {
                        match fs::read_to_string(path)
                            .with_context(|| format!("Failed to read file: {}", path.display()))
                        {
                            Ok(content) => files.push((path.to_path_buf(), content)),
                            Err(e) => warn!("{:#}", e),
                        }
                    }
                }
                Err(e) => warn!("Failed to access path: {}", e),
            }
        }

        debug!("Found {} Rust files under {}", files.len(), root.display());
        Ok(Self::from_sources(files))
    }

    /// Builds an index from in-memory `(path, source)` pairs.
    pub fn from_sources<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = (PathBuf, String)>,
    {
        let mut index = SourceIndex::default();

        for (path, content) in sources {
            match syn::parse_file(&content) {
                Ok(file) => {
                    index.index_items(&file.items, &path);
                    index.sources.insert(path, content);
                }
                Err(e) => warn!("Failed to parse {}: {}", path.display(), e),
            }
        }

        debug!("Indexed {} handlers", index.handlers.len());
        index
    }

    /// Number of indexed handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn index_items(&mut self, items: &[Item], path: &Path) {
        for item in items {
            match item {
                Item::Fn(func) => {
                    self.insert(func.sig.ident.to_string(), &func.attrs, path);
                }
                Item::Impl(item_impl) => {
                    let Some(type_name) = self_type_name(&item_impl.self_ty) else {
                        continue;
                    };
                    for impl_item in &item_impl.items {
                        if let ImplItem::Fn(method) = impl_item {
                            let key = format!("{}::{}", type_name, method.sig.ident);
                            self.insert(key, &method.attrs, path);
                        }
                    }
                }
                Item::Mod(module) => {
                    if let Some((_, items)) = &module.content {
                        self.index_items(items, path);
                    }
                }
                _ => {}
            }
        }
    }

    fn insert(&mut self, key: String, attrs: &[Attribute], path: &Path) {
        if self.handlers.contains_key(&key) {
            debug!("Duplicate handler {} in {}, keeping the first", key, path.display());
            return;
        }
        self.handlers.insert(
            key,
            HandlerEntry {
                doc: doc_text(attrs),
                file: path.to_path_buf(),
            },
        );
    }

    /// Finds a handler by exact id, then by its last two `::` segments, then by its last segment.
    fn lookup(&self, handler: &str) -> Option<&HandlerEntry> {
        if let Some(entry) = self.handlers.get(handler) {
            return Some(entry);
        }
        let segments: Vec<&str> = handler.split("::").collect();
        if segments.len() > 2 {
            let tail = segments[segments.len() - 2..].join("::");
            if let Some(entry) = self.handlers.get(&tail) {
                return Some(entry);
            }
        }
        segments.last().and_then(|last| self.handlers.get(*last))
    }
}

impl CommentSource for SourceIndex {
    fn doc_comment(&self, handler: &str) -> Option<String> {
        self.lookup(handler).and_then(|entry| entry.doc.clone())
    }

    fn declaring_source(&self, handler: &str) -> Option<&str> {
        self.lookup(handler)
            .and_then(|entry| self.sources.get(&entry.file))
            .map(String::as_str)
    }
}

/// Name of the implementing type, without generics
fn self_type_name(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        _ => None,
    }
}

/// Joins the `#[doc = "..."]` attributes, dropping the single leading space rustdoc adds
fn doc_text(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(name_value) => match &name_value.value {
                Expr::Lit(expr_lit) => match &expr_lit.lit {
                    Lit::Str(text) => Some(text.value()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .map(|line| line.strip_prefix(' ').map(str::to_string).unwrap_or(line))
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
