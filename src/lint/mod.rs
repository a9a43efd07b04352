//! Schema Linting
//!
//! Flags authoring inconsistencies in a registry without changing it. The
//! declarations stay as published; the linter only reports.
//!
//! ## Lints
//! 1. **duplicate-parameter-location** (warning): one name declared in several
//!    locations of the same endpoint
//! 2. **opaque-response** (warning): a response declared as an object with no
//!    structure
//! 3. **unreferenced-record** (warning): a record no endpoint can reach
//! 4. **naming** (warning): operation ids or field names that are not
//!    lowerCamelCase
//! 5. **body-on-safe-method** (error): a request body on GET or DELETE

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::endpoint::{Endpoint, ParamLocation};
use crate::registry::SchemaRegistry;
use crate::schema::TypeRef;

/// Result of linting a registry
#[derive(Debug, Default, Serialize)]
pub struct LintResult {
    pub errors: Vec<LintFinding>,
    pub warnings: Vec<LintFinding>,
}

impl LintResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Findings with a given code, errors first
    pub fn with_code(&self, code: &str) -> Vec<&LintFinding> {
        self.errors
            .iter()
            .chain(&self.warnings)
            .filter(|f| f.code == code)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintFinding {
    pub code: &'static str,
    pub message: String,
    /// What the finding is about (an endpoint, record or field)
    pub subject: String,
}

fn camel_case() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z][A-Za-z0-9]*$").expect("camelCase pattern is valid"))
}

/// The registry linter
#[derive(Debug, Default)]
pub struct RegistryLinter {
    /// Codes that are never reported
    allowed: HashSet<String>,
}

impl RegistryLinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress the given lint codes
    pub fn allow<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed.extend(codes.into_iter().map(Into::into));
        self
    }

    /// Lint every record and endpoint
    pub fn lint(&self, registry: &SchemaRegistry) -> LintResult {
        let mut result = LintResult::default();

        for endpoint in registry.endpoints() {
            self.lint_endpoint(endpoint, &mut result);
        }
        self.lint_reachability(registry, &mut result);
        self.lint_field_names(registry, &mut result);

        for finding in &result.warnings {
            tracing::warn!(code = finding.code, subject = %finding.subject, "{}", finding.message);
        }
        for finding in &result.errors {
            tracing::error!(code = finding.code, subject = %finding.subject, "{}", finding.message);
        }
        result
    }

    fn lint_endpoint(&self, endpoint: &Endpoint, result: &mut LintResult) {
        let subject = endpoint.to_string();

        let mut seen: Vec<(&str, ParamLocation)> = Vec::new();
        for param in &endpoint.params {
            let elsewhere: Vec<ParamLocation> = seen
                .iter()
                .filter(|(name, location)| *name == param.name && *location != param.location)
                .map(|(_, location)| *location)
                .collect();
            for other in elsewhere {
                self.warn(
                    result,
                    "duplicate-parameter-location",
                    &subject,
                    format!(
                        "parameter '{}' is declared both as {} and as {}; likely an authoring duplicate",
                        param.name, other, param.location
                    ),
                );
            }
            seen.push((param.name.as_str(), param.location));
        }

        if endpoint.response == Some(TypeRef::OpaqueObject) {
            self.warn(
                result,
                "opaque-response",
                &subject,
                "response is an object with no declared fields".to_string(),
            );
        }

        if endpoint.method.is_bodyless() && endpoint.request_body.is_some() {
            self.error(
                result,
                "body-on-safe-method",
                &subject,
                format!("{} must not declare a request body", endpoint.method),
            );
        }

        if let Some(id) = &endpoint.operation_id {
            if !camel_case().is_match(id) {
                self.warn(
                    result,
                    "naming",
                    &subject,
                    format!("operation id '{}' is not lowerCamelCase", id),
                );
            }
        }
    }

    fn lint_reachability(&self, registry: &SchemaRegistry, result: &mut LintResult) {
        let mut reachable: HashSet<&str> = HashSet::new();
        let mut pending: Vec<&str> = registry
            .endpoints()
            .flat_map(|e| e.referenced_records())
            .collect();

        while let Some(name) = pending.pop() {
            if !reachable.insert(name) {
                continue;
            }
            if let Some(shape) = registry.record(name) {
                pending.extend(shape.references());
            }
        }

        for shape in registry.records() {
            if !reachable.contains(shape.name.as_str()) {
                self.warn(
                    result,
                    "unreferenced-record",
                    &shape.name,
                    "no endpoint refers to this record, directly or through another record"
                        .to_string(),
                );
            }
        }
    }

    fn lint_field_names(&self, registry: &SchemaRegistry, result: &mut LintResult) {
        for shape in registry.records() {
            for field in &shape.fields {
                if !camel_case().is_match(&field.name) {
                    self.warn(
                        result,
                        "naming",
                        &format!("{}.{}", shape.name, field.name),
                        format!("field '{}' is not lowerCamelCase", field.name),
                    );
                }
            }
        }
    }

    fn warn(&self, result: &mut LintResult, code: &'static str, subject: &str, message: String) {
        if !self.allowed.contains(code) {
            result.warnings.push(LintFinding {
                code,
                message,
                subject: subject.to_string(),
            });
        }
    }

    fn error(&self, result: &mut LintResult, code: &'static str, subject: &str, message: String) {
        if !self.allowed.contains(code) {
            result.errors.push(LintFinding {
                code,
                message,
                subject: subject.to_string(),
            });
        }
    }
}
