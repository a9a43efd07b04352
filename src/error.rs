//! Error types for the Petstore schema registry

use thiserror::Error;

use crate::conformance::Violation;
use crate::endpoint::{HttpMethod, ParamLocation};

/// Result type for schema operations
pub type Result<T> = std::result::Result<T, SchemaError>;

/// Schema registry errors
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Endpoint not found: {method} {path}{}", format_suggestions(.suggestions))]
    EndpointNotFound {
        method: HttpMethod,
        path: String,
        suggestions: Vec<String>,
    },

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Operation not found: {0}")]
    OperationNotFound(String),

    #[error("Record already declared: {0}")]
    DuplicateRecord(String),

    #[error("Endpoint already declared: {method} {path}")]
    DuplicateEndpoint { method: HttpMethod, path: String },

    #[error("Parameter '{name}' declared twice in {location} of {method} {path}")]
    DuplicateParameter {
        method: HttpMethod,
        path: String,
        name: String,
        location: ParamLocation,
    },

    #[error("Unknown record '{name}' referenced by {referenced_by}")]
    UnknownRecord { name: String, referenced_by: String },

    #[error("Invalid path template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("Path parameter mismatch on {method} {path}: {reason}")]
    PathParamMismatch {
        method: HttpMethod,
        path: String,
        reason: String,
    },

    #[error("Missing required {location} parameter '{name}'")]
    MissingParameter { name: String, location: ParamLocation },

    #[error("Undeclared {location} parameter '{name}'")]
    UnknownParameter { name: String, location: ParamLocation },

    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Missing request body for {method} {path}")]
    MissingBody { method: HttpMethod, path: String },

    #[error("{method} {path} declares no request body")]
    UnexpectedBody { method: HttpMethod, path: String },

    #[error("Shape mismatch in {context}: {}", format_violations(.violations))]
    ShapeMismatch {
        context: String,
        violations: Vec<Violation>,
    },

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Base URL cannot carry path segments: {0}")]
    InvalidBaseUrl(String),

    #[error("Unknown export target: {0} (expected typescript, json-schema or json)")]
    UnknownTarget(String),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Semver error: {0}")]
    Semver(#[from] semver::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),
}

fn format_suggestions(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        String::new()
    } else {
        format!(" (did you mean {}?)", suggestions.join(", "))
    }
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
