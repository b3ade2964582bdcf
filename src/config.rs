//! Config source: per path-group document metadata.
//!
//! The configuration file is a YAML map keyed by URI prefix. Every route whose
//! URI contains the prefix is documented into that group's output file.
//!
//! ```yaml
//! api/v1:
//!   api_version: v1
//!   title: Widget API
//!   contact:
//!     email: contact@domain.com
//!   servers:
//!     - url: http://appname.localhost
//!       description: Local
//!   security:
//!     api.keys:
//!       type: apiKey
//!       name: X-Auth-Token
//!       in: header
//!   tags: []
//!   output: openapi.json
//! ```

use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Return type marking handlers whose `@return` tag documents a JSON body
pub const DEFAULT_JSON_RESPONSE_TYPE: &str = "Json";

/// All configured path-groups, keyed by URI prefix.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config {
    /// Group settings keyed by URI prefix
    pub groups: BTreeMap<String, GroupConfig>,
}

/// Metadata and output location for one path-group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Version string written to `info.version`
    pub api_version: String,
    /// Title written to `info.title`
    pub title: String,
    /// Contact written to `info.contact`
    #[serde(default)]
    pub contact: Contact,
    /// Servers written to the document's `servers`
    #[serde(default)]
    pub servers: Vec<Server>,
    /// Tags written to the document's `tags`
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Security scheme objects keyed by middleware name, copied verbatim into
    /// `components.securitySchemes`
    #[serde(default)]
    pub security: BTreeMap<String, serde_json::Value>,
    /// Output file, relative to the base directory
    pub output: PathBuf,
    /// Last path segment of the return type that carries a JSON body
    #[serde(default = "default_json_response_type")]
    pub json_response_type: String,
}

fn default_json_response_type() -> String {
    DEFAULT_JSON_RESPONSE_TYPE.to_string()
}

/// OpenAPI Contact object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Contact name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Contact URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Contact email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    /// Server URL
    pub url: String,
    /// Server description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Tag object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name
    pub name: String,
    /// Tag description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Config {
    /// Parses a configuration document from YAML text.
    pub fn from_yaml(content: &str, origin: &Path) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Config {
            file: origin.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Reads and parses the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<Config> {
    debug!("Loading configuration: {}", path.display());
    let content = fs::read_to_string(path)?;
    let config = Config::from_yaml(&content, path)?;
    debug!("Configured path-groups: {:?}", config.groups.keys().collect::<Vec<_>>());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
api/v1:
  api_version: v1
  title: Widget API
  contact:
    email: contact@domain.com
  servers:
    - url: http://appname.localhost
      description: Local
    - url: www.domain.url
  security:
    api.keys:
      type: apiKey
      name: X-Auth-Token
      in: header
  tags:
    - name: widgets
  output: openapi.json
"#;

    #[test]
    fn test_parse_group() {
        let config = Config::from_yaml(SAMPLE, Path::new("swagger.yaml")).unwrap();
        let group = &config.groups["api/v1"];

        assert_eq!(group.title, "Widget API");
        assert_eq!(group.api_version, "v1");
        assert_eq!(group.contact.email.as_deref(), Some("contact@domain.com"));
        assert_eq!(group.servers.len(), 2);
        assert_eq!(group.servers[1].description, None);
        assert_eq!(group.tags[0].name, "widgets");
        assert_eq!(group.security["api.keys"]["name"], "X-Auth-Token");
        assert_eq!(group.output, PathBuf::from("openapi.json"));
        assert_eq!(group.json_response_type, DEFAULT_JSON_RESPONSE_TYPE);
    }

    #[test]
    fn test_optional_sections_default() {
        let yaml = "api:\n  api_version: '1'\n  title: T\n  output: out/doc.json\n";
        let config = Config::from_yaml(yaml, Path::new("c.yaml")).unwrap();
        let group = &config.groups["api"];

        assert!(group.servers.is_empty());
        assert!(group.tags.is_empty());
        assert!(group.security.is_empty());
        assert_eq!(group.contact, Contact::default());
    }

    #[test]
    fn test_missing_output_is_config_error() {
        let yaml = "api:\n  api_version: '1'\n  title: T\n";
        let err = Config::from_yaml(yaml, Path::new("c.yaml")).unwrap_err();

        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("c.yaml"));
    }

    #[test]
    fn test_load_config_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("swagger.yaml");
        fs::write(&path, SAMPLE).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.groups.len(), 1);
    }
}
