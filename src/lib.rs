//! OpenAPI from annotations - OpenAPI 3.0 documents compiled from handler doc comments.
//!
//! Route handlers describe their inputs and outputs with `@param`, `@return`
//! and `@throws` tags in their doc comments. Field lists use a bracket
//! mini-grammar, `[int $id required The id, string $name]`, with double
//! brackets marking an array. This library turns those annotations into one
//! OpenAPI document per configured path-group.
//!
//! # Architecture
//!
//! 1. [`routes`] - Loads the registered routes from a manifest
//! 2. [`comment_source`] - Indexes handler doc comments from source files
//! 3. [`annotation`] - Parses a doc comment into tags
//! 4. [`expander`] - Expands the bracket mini-grammar into field tags
//! 5. [`schema`] - Maps field types to schema fragments and model references
//! 6. [`parameters`], [`responses`], [`security`] - Build the parts of an operation
//! 7. [`template`] - Request body templates and the key-replacing merge
//! 8. [`openapi_builder`] - Assembles a group's document
//! 9. [`compiler`] - Filters routes per group and drives the pipeline
//! 10. [`serializer`] - Writes documents as JSON or YAML
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_annotations::{
//!     comment_source::SourceIndex,
//!     compiler::Compiler,
//!     config::load_config,
//!     routes::load_routes,
//!     serializer::FileSink,
//! };
//! use std::path::{Path, PathBuf};
//!
//! let config = load_config(Path::new("openapi.yaml")).unwrap();
//! let routes = load_routes(Path::new("routes.yaml")).unwrap();
//! let index = SourceIndex::scan(Path::new("./src")).unwrap();
//!
//! let compiler = Compiler::new(&routes, &index);
//! let mut sink = FileSink::new(PathBuf::from("."));
//! let report = compiler.compile_all(&config, &mut sink);
//! assert!(report.is_success());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod annotation;
pub mod cli;
pub mod comment_source;
pub mod compiler;
pub mod config;
pub mod error;
pub mod expander;
pub mod openapi_builder;
pub mod parameters;
pub mod responses;
pub mod routes;
pub mod schema;
pub mod security;
pub mod serializer;
pub mod template;
