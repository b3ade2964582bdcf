//! Document sink: serializes finished documents and writes them out.
//!
//! Documents are written as pretty-printed JSON, or as YAML when the configured
//! output file ends in `.yaml` or `.yml`.

use crate::config::GroupConfig;
use crate::error::Result;
use crate::openapi_builder::OpenApiDocument;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// Output format of a document file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Yaml,
}

impl OutputFormat {
    /// Picks the format from the file extension, defaulting to JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => OutputFormat::Yaml,
            _ => OutputFormat::Json,
        }
    }
}

/// Destination for finished path-group documents.
pub trait DocumentSink {
    /// Writes the document of the group configured by `config`.
    fn write(&mut self, prefix: &str, config: &GroupConfig, document: &OpenApiDocument) -> Result<()>;
}

/// Writes each document to its configured output path below a base directory.
pub struct FileSink {
    base_dir: PathBuf,
}

impl FileSink {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Where the document of `config` is written
    pub fn output_path(&self, config: &GroupConfig) -> PathBuf {
        self.base_dir.join(&config.output)
    }
}

impl DocumentSink for FileSink {
    fn write(&mut self, prefix: &str, config: &GroupConfig, document: &OpenApiDocument) -> Result<()> {
        let path = self.output_path(config);
        let content = match OutputFormat::from_path(&path) {
            OutputFormat::Json => serialize_json(document)?,
            OutputFormat::Yaml => serialize_yaml(document)?,
        };
        debug!("Writing document for {} to {}", prefix, path.display());
        write_to_file(&content, &path)
    }
}

/// Serializes an OpenAPI document to pretty-printed JSON.
///
/// Slashes are never escaped, so paths and `$ref` values stay readable.
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Serializes an OpenAPI document to YAML.
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    Ok(serde_yaml::to_string(doc)?)
}

/// Writes string content to a file, creating parent directories as needed.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, content)?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
