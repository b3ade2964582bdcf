use openapi_from_annotations::{
    comment_source::SourceIndex,
    compiler::Compiler,
    config::load_config,
    error::Error,
    routes::load_routes,
    serializer::FileSink,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const WIDGET_CONTROLLER: &str = r#"
use crate::models::{Gadget, Widget};

pub struct WidgetController;

impl WidgetController {
    /// List widgets
    ///
    /// @param Query $query [int $page required Page number, float $ratio, boolean $active, string $sort]
    /// @return Json Widget page [[Widget $widget, Gadget $gadget]]
    /// @throws Unauthorized @code 401 Not logged in
    pub async fn index() {}

    /// Create a widget
    ///
    /// @param Form $form [string $name required Widget name, int $size, Widget $widget]
    /// @return Json @code 201 Created [int $id, string $name]
    /// @throws Invalid @code 422 Validation failed
    /// @throws Failure Server error
    pub async fn store() {}

    /// @return Html The rendered widget
    pub async fn show() {}

    /// Replace a widget
    ///
    /// @param Form $form [string $name required]
    /// @return Json @code 404 Widget not found
    pub async fn update() {}
}
"#;

const HEALTH: &str = r#"
/// Health probe
///
/// @return Json Service status [string $status, array $checks]
pub async fn health() {}

/// Ambiguous
///
/// @return Json Pair [Widget $a, Gadget $b]
pub async fn ambiguous() {}
"#;

const ROUTES: &str = r#"
- uri: /api/v1/widgets
  method: GET
  handler: WidgetController::index
  middleware: [api.keys]
- uri: /api/v1/widgets
  method: POST
  handler: app::http::WidgetController::store
  middleware: [api.keys]
- uri: /api/v1/widgets/{id}
  method: GET
  handler: WidgetController::show
- uri: /api/v1/widgets/{id}
  method: PUT
  handler: WidgetController::update
  middleware: [api.keys]
- uri: /api/v1/widgets/{id}
  method: DELETE
  handler: WidgetController::destroy
  middleware: [api.keys]
- uri: /health
  method: GET
  handler: health
"#;

const CONFIG: &str = r#"
api/v1:
  api_version: v1
  title: Widget API
  contact:
    name: Widget Team
    email: contact@domain.com
  servers:
    - url: http://appname.localhost
      description: Local
  tags:
    - name: widgets
  security:
    api.keys:
      type: apiKey
      name: X-Auth-Token
      in: header
  output: public/v1/openapi.json
health:
  api_version: "1.0"
  title: Health
  output: public/health.yaml
"#;

/// Helper function to create a temporary test project
fn create_test_project(files: Vec<(&str, &str)>) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");

    for (path, content) in files {
        let file_path = temp_dir.path().join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
    }

    temp_dir
}

fn widget_project(routes: &str) -> TempDir {
    create_test_project(vec![
        ("src/http/widgets.rs", WIDGET_CONTROLLER),
        ("src/health.rs", HEALTH),
        ("routes.yaml", routes),
        ("openapi.yaml", CONFIG),
    ])
}

/// Runs the whole pipeline over a project directory and reports the failed prefixes
fn compile(root: &Path) -> Vec<String> {
    let config = load_config(&root.join("openapi.yaml")).expect("Failed to load config");
    let routes = load_routes(&root.join("routes.yaml")).expect("Failed to load routes");
    let index = SourceIndex::scan(&root.join("src")).expect("Failed to index sources");

    let compiler = Compiler::new(&routes, &index);
    let mut sink = FileSink::new(root.to_path_buf());
    let report = compiler.compile_all(&config, &mut sink);

    report.failed.into_iter().map(|(prefix, _)| prefix).collect()
}

fn read_json(path: &Path) -> Value {
    let content = fs::read_to_string(path).expect("Failed to read document");
    serde_json::from_str(&content).expect("Document is not valid JSON")
}

#[test]
fn test_end_to_end_document_shape() {
    let temp_dir = widget_project(ROUTES);
    assert!(compile(temp_dir.path()).is_empty());

    let document = read_json(&temp_dir.path().join("public/v1/openapi.json"));

    let keys: Vec<&String> = document.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["openapi", "info", "servers", "tags", "paths", "components"]);
    assert_eq!(document["openapi"], "3.0.0");
    assert_eq!(
        document["info"],
        json!({
            "title": "Widget API",
            "contact": {"name": "Widget Team", "email": "contact@domain.com"},
            "version": "v1"
        })
    );
    assert_eq!(
        document["servers"],
        json!([{"url": "http://appname.localhost", "description": "Local"}])
    );
    assert_eq!(document["tags"], json!([{"name": "widgets"}]));
    assert_eq!(
        document["components"],
        json!({
            "securitySchemes": {
                "api.keys": {"type": "apiKey", "name": "X-Auth-Token", "in": "header"}
            }
        })
    );
}

#[test]
fn test_only_prefixed_routes_are_documented() {
    let temp_dir = widget_project(ROUTES);
    assert!(compile(temp_dir.path()).is_empty());

    let v1 = read_json(&temp_dir.path().join("public/v1/openapi.json"));
    let paths: Vec<&String> = v1["paths"].as_object().unwrap().keys().collect();
    assert_eq!(paths, vec!["/api/v1/widgets", "/api/v1/widgets/{id}"]);

    // destroy has no doc comment
    assert!(v1["paths"]["/api/v1/widgets/{id}"].get("delete").is_none());

    let health: Value = serde_yaml::from_str(
        &fs::read_to_string(temp_dir.path().join("public/health.yaml")).unwrap(),
    )
    .unwrap();
    let paths: Vec<&String> = health["paths"].as_object().unwrap().keys().collect();
    assert_eq!(paths, vec!["/health"]);
    assert!(health.get("components").is_none());
}

#[test]
fn test_get_yields_query_parameters() {
    let temp_dir = widget_project(ROUTES);
    compile(temp_dir.path());

    let document = read_json(&temp_dir.path().join("public/v1/openapi.json"));
    let operation = &document["paths"]["/api/v1/widgets"]["get"];

    assert_eq!(operation["operationId"], "WidgetController::index");
    assert_eq!(operation["description"], "List widgets");
    assert!(operation.get("requestBody").is_none());
    assert_eq!(
        operation["parameters"],
        json!([
            {"name": "page", "in": "query", "required": true, "schema": {"type": "integer"}, "description": "Page number"},
            {"name": "ratio", "in": "query", "required": false, "schema": {"type": "float"}},
            {"name": "active", "in": "query", "required": false, "schema": {"type": "boolean"}},
            {"name": "sort", "in": "query", "required": false, "schema": {"type": "string"}}
        ])
    );
    assert_eq!(operation["security"], json!([{"api.keys": ["read"]}]));
}

#[test]
fn test_array_of_models_yields_any_of() {
    let temp_dir = widget_project(ROUTES);
    compile(temp_dir.path());

    let document = read_json(&temp_dir.path().join("public/v1/openapi.json"));
    let responses = &document["paths"]["/api/v1/widgets"]["get"]["responses"];

    assert_eq!(
        responses["200"],
        json!({
            "description": "Widget page",
            "content": {
                "application/json": {
                    "schema": {"anyOf": [
                        {"$ref": "#/components/schemas/Widget"},
                        {"$ref": "#/components/schemas/Gadget"}
                    ]}
                }
            }
        })
    );
    assert_eq!(responses["401"], json!({"description": "Not logged in"}));
}

#[test]
fn test_post_yields_request_body() {
    let temp_dir = widget_project(ROUTES);
    compile(temp_dir.path());

    let document = read_json(&temp_dir.path().join("public/v1/openapi.json"));
    let operation = &document["paths"]["/api/v1/widgets"]["post"];

    assert_eq!(operation["operationId"], "app::http::WidgetController::store");
    assert!(operation.get("parameters").is_none());
    assert_eq!(
        operation["requestBody"],
        json!({
            "required": true,
            "content": {
                "application/x-www-form-urlencoded": {
                    "schema": {
                        "type": "object",
                        "properties": {
                            "name": {"type": "string", "description": "Widget name"},
                            "size": {"type": "integer"}
                        },
                        "required": ["name"]
                    }
                },
                "application/json": {
                    "schema": {"$ref": "#/components/schemas/Widget"}
                }
            }
        })
    );
    assert_eq!(operation["security"], json!([{"api.keys": ["write"]}]));
}

#[test]
fn test_response_codes() {
    let temp_dir = widget_project(ROUTES);
    compile(temp_dir.path());

    let document = read_json(&temp_dir.path().join("public/v1/openapi.json"));
    let responses = &document["paths"]["/api/v1/widgets"]["post"]["responses"];

    let codes: Vec<&String> = responses.as_object().unwrap().keys().collect();
    assert_eq!(codes, vec!["201", "422", "500"]);
    assert_eq!(
        responses["201"]["content"]["application/json"]["schema"],
        json!({
            "type": "object",
            "properties": {"id": {"type": "integer"}, "name": {"type": "string"}}
        })
    );
    assert_eq!(responses["500"], json!({"description": "Server error"}));

    let update = &document["paths"]["/api/v1/widgets/{id}"]["put"];
    assert_eq!(update["responses"]["404"]["description"], "Widget not found");
    assert_eq!(update["security"], json!([{"api.keys": ["update"]}]));
}

#[test]
fn test_required_word_is_removed_from_description() {
    let temp_dir = widget_project(ROUTES);
    compile(temp_dir.path());

    let document = read_json(&temp_dir.path().join("public/v1/openapi.json"));
    let schema = &document["paths"]["/api/v1/widgets/{id}"]["put"]["requestBody"]["content"]
        ["application/x-www-form-urlencoded"]["schema"];

    assert_eq!(schema["properties"]["name"], json!({"type": "string"}));
    assert_eq!(schema["required"], json!(["name"]));
}

#[test]
fn test_operation_without_parameters_has_no_description() {
    let temp_dir = widget_project(ROUTES);
    compile(temp_dir.path());

    let document = read_json(&temp_dir.path().join("public/v1/openapi.json"));
    let show = &document["paths"]["/api/v1/widgets/{id}"]["get"];

    assert_eq!(
        show,
        &json!({
            "operationId": "WidgetController::show",
            "responses": {"200": {"description": "The rendered widget"}},
            "security": []
        })
    );
}

#[test]
fn test_fatal_error_aborts_group_only() {
    let routes = format!(
        "{}- uri: /api/v1/pairs\n  method: GET\n  handler: ambiguous\n",
        ROUTES
    );
    let temp_dir = widget_project(&routes);

    let failed = compile(temp_dir.path());

    assert_eq!(failed, vec!["api/v1".to_string()]);
    assert!(!temp_dir.path().join("public/v1/openapi.json").exists());
    assert!(temp_dir.path().join("public/health.yaml").exists());
}

#[test]
fn test_missing_security_scheme_is_reported() {
    let routes = ROUTES.replace("handler: health", "handler: health\n  middleware: [auth]");
    let temp_dir = widget_project(&routes);

    let config = load_config(&temp_dir.path().join("openapi.yaml")).unwrap();
    let routes = load_routes(&temp_dir.path().join("routes.yaml")).unwrap();
    let index = SourceIndex::scan(&temp_dir.path().join("src")).unwrap();
    let compiler = Compiler::new(&routes, &index);

    let err = compiler
        .compile_group("health", &config.groups["health"])
        .unwrap_err();

    assert!(matches!(err, Error::MissingSecurityScheme { .. }));
    assert_eq!(
        err.to_string(),
        "invalid security configuration, add a config entry for auth @ /health"
    );
}

#[test]
fn test_repeated_runs_are_byte_identical() {
    let temp_dir = widget_project(ROUTES);
    let v1 = temp_dir.path().join("public/v1/openapi.json");
    let health = temp_dir.path().join("public/health.yaml");

    assert!(compile(temp_dir.path()).is_empty());
    let first = (fs::read(&v1).unwrap(), fs::read(&health).unwrap());

    assert!(compile(temp_dir.path()).is_empty());
    let second = (fs::read(&v1).unwrap(), fs::read(&health).unwrap());

    assert_eq!(first, second);
}

#[test]
fn test_json_routes_manifest() {
    let temp_dir = create_test_project(vec![
        ("src/health.rs", HEALTH),
        ("openapi.yaml", CONFIG),
        (
            "routes.json",
            r#"[{"uri": "/health", "method": "GET", "handler": "health"}]"#,
        ),
    ]);

    let routes = load_routes(&temp_dir.path().join("routes.json")).unwrap();
    let index = SourceIndex::scan(&temp_dir.path().join("src")).unwrap();
    let config = load_config(&temp_dir.path().join("openapi.yaml")).unwrap();
    let document = Compiler::new(&routes, &index)
        .compile_group("health", &config.groups["health"])
        .unwrap();

    let value = serde_json::to_value(&document).unwrap();
    assert_eq!(
        value["paths"]["/health"]["get"]["responses"]["200"]["content"]["application/json"]["schema"],
        json!({
            "type": "object",
            "properties": {"status": {"type": "string"}, "checks": {"type": "array"}}
        })
    );
}

#[test]
fn test_param_without_variable_name_is_documented() {
    let temp_dir = create_test_project(vec![
        (
            "src/feedback.rs",
            "/// Send feedback\n///\n/// @param Request request [string $message required]\n/// @return Json Ok\npub async fn send() {}\n",
        ),
        ("openapi.yaml", CONFIG),
        (
            "routes.yaml",
            "- uri: /api/v1/feedback\n  method: POST\n  handler: send\n",
        ),
    ]);

    assert!(compile(temp_dir.path()).is_empty());

    let document = read_json(&temp_dir.path().join("public/v1/openapi.json"));
    let operation = &document["paths"]["/api/v1/feedback"]["post"];
    assert_eq!(operation["description"], "Send feedback");
    assert_eq!(
        operation["requestBody"]["content"]["application/x-www-form-urlencoded"]["schema"]["required"],
        json!(["message"])
    );
}
