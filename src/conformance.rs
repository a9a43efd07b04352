//! Structural conformance of JSON documents
//!
//! Checks that a decoded document has the shape a [`TypeRef`] declares. This
//! is purely structural: field presence and JSON types. Values are never
//! judged (an empty string or a zero is as good as any other).
//!
//! Rules:
//! - required record fields must be present
//! - optional fields may be absent, but `null` is not a declared value for
//!   any field
//! - fields the shape does not declare are ignored
//! - integers must fit in an `i64`; `1.0` is a number, not an integer
//! - an opaque object accepts any object
//! - when an endpoint declares no body shape, any body (or none) conforms

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::endpoint::Endpoint;
use crate::error::{Result, SchemaError};
use crate::registry::SchemaRegistry;
use crate::schema::TypeRef;

/// A single structural mismatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// JSON-pointer style location ("" is the document root)
    pub path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "{}: {}", path, self.message)
    }
}

/// Collect every violation of `value` against `type_ref`
pub fn check_value(registry: &SchemaRegistry, type_ref: &TypeRef, value: &Value) -> Vec<Violation> {
    let mut violations = Vec::new();
    walk(registry, type_ref, value, String::new(), &mut violations);
    violations
}

/// Check a response body against the endpoint's declared response.
///
/// `body` is `None` when the response carried no body at all.
pub fn check_response(registry: &SchemaRegistry, endpoint: &Endpoint, body: Option<&Value>) -> Result<()> {
    check_body(registry, endpoint, endpoint.response.as_ref(), body, "response")
}

/// Check a request body against the endpoint's declared request body
pub fn check_request_body(
    registry: &SchemaRegistry,
    endpoint: &Endpoint,
    body: Option<&Value>,
) -> Result<()> {
    check_body(registry, endpoint, endpoint.request_body.as_ref(), body, "request body")
}

fn check_body(
    registry: &SchemaRegistry,
    endpoint: &Endpoint,
    declared: Option<&TypeRef>,
    body: Option<&Value>,
    what: &str,
) -> Result<()> {
    let context = format!("{} of {}", what, endpoint);

    let Some(declared) = declared else {
        // Undeclared bodies are opaque
        tracing::debug!(endpoint = %endpoint, "no {} shape declared, accepting as opaque", what);
        return Ok(());
    };

    let Some(body) = body else {
        return Err(SchemaError::ShapeMismatch {
            context,
            violations: vec![Violation {
                path: String::new(),
                message: format!("expected {}, got no body", declared),
            }],
        });
    };

    let violations = check_value(registry, declared, body);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::ShapeMismatch { context, violations })
    }
}

fn walk(registry: &SchemaRegistry, type_ref: &TypeRef, value: &Value, path: String, out: &mut Vec<Violation>) {
    let mismatch = |out: &mut Vec<Violation>, path: String| {
        out.push(Violation {
            path,
            message: format!("expected {}, got {}", type_ref, json_kind(value)),
        });
    };

    match type_ref {
        TypeRef::Integer => {
            if value.is_u64() && !value.is_i64() {
                out.push(Violation {
                    path,
                    message: format!("integer {} out of range for a 64-bit signed integer", value),
                });
            } else if !value.is_i64() {
                mismatch(out, path);
            }
        }
        TypeRef::String => {
            if !value.is_string() {
                mismatch(out, path);
            }
        }
        TypeRef::Boolean => {
            if !value.is_boolean() {
                mismatch(out, path);
            }
        }
        TypeRef::OpaqueObject => {
            if !value.is_object() {
                mismatch(out, path);
            }
        }
        TypeRef::Array { items } => match value.as_array() {
            Some(elements) => {
                for (i, element) in elements.iter().enumerate() {
                    walk(registry, items, element, format!("{}/{}", path, i), out);
                }
            }
            None => mismatch(out, path),
        },
        TypeRef::Record { name } => {
            let Some(shape) = registry.record(name) else {
                out.push(Violation {
                    path,
                    message: format!("unknown record '{}'", name),
                });
                return;
            };
            let Some(object) = value.as_object() else {
                mismatch(out, path);
                return;
            };
            for field in &shape.fields {
                let field_path = format!("{}/{}", path, field.name);
                match object.get(&field.name) {
                    None if field.required => out.push(Violation {
                        path: field_path,
                        message: format!("missing required field '{}'", field.name),
                    }),
                    None => {}
                    Some(field_value) => walk(registry, &field.type_ref, field_value, field_path, out),
                }
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::petstore;
    use crate::endpoint::HttpMethod;
    use serde_json::json;

    #[test]
    fn test_pet_conforms() {
        let registry = petstore().unwrap();
        let pet = json!({
            "id": 10,
            "name": "doggie",
            "category": { "id": 1, "name": "Dogs" },
            "photoUrls": ["https://example.com/a.png"],
            "tags": [{ "id": 0, "name": "" }],
            "status": "available"
        });
        assert!(check_value(&registry, &TypeRef::record("Pet"), &pet).is_empty());
    }

    #[test]
    fn test_missing_required_fields() {
        let registry = petstore().unwrap();
        let violations = check_value(&registry, &TypeRef::record("Pet"), &json!({ "status": "sold" }));
        let paths: Vec<&str> = violations.iter().map(|v| v.path.as_str()).collect();
        assert_eq!(paths, vec!["/name", "/photoUrls"]);
        assert_eq!(violations[0].message, "missing required field 'name'");
    }

    #[test]
    fn test_nested_type_mismatch() {
        let registry = petstore().unwrap();
        let pet = json!({
            "name": "doggie",
            "photoUrls": ["ok", 3],
            "tags": [{ "id": "one" }]
        });
        let violations = check_value(&registry, &TypeRef::record("Pet"), &pet);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].path, "/photoUrls/1");
        assert_eq!(violations[0].message, "expected string, got integer");
        assert_eq!(violations[1].path, "/tags/0/id");
    }

    #[test]
    fn test_absent_optional_and_extra_fields_accepted() {
        let registry = petstore().unwrap();
        let order = json!({ "complete": false, "extra": [1, 2] });
        assert!(check_value(&registry, &TypeRef::record("Order"), &order).is_empty());
    }

    #[test]
    fn test_null_is_not_absence() {
        let registry = petstore().unwrap();
        let violations = check_value(&registry, &TypeRef::record("Order"), &json!({ "id": null }));
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "/id");
        assert_eq!(violations[0].message, "expected integer, got null");
    }

    #[test]
    fn test_float_is_not_integer() {
        let registry = petstore().unwrap();
        let violations = check_value(&registry, &TypeRef::Integer, &json!(1.5));
        assert_eq!(violations[0].message, "expected integer, got number");
    }

    #[test]
    fn test_integer_beyond_i64_rejected() {
        let registry = petstore().unwrap();
        let order = json!({ "id": u64::MAX });
        let violations = check_value(&registry, &TypeRef::record("Order"), &order);
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "/id");
        assert!(violations[0].message.contains("out of range"));
        assert!(serde_json::from_value::<crate::models::Order>(order).is_err());

        let at_limit = json!({ "id": i64::MAX });
        assert!(check_value(&registry, &TypeRef::record("Order"), &at_limit).is_empty());
        assert!(serde_json::from_value::<crate::models::Order>(at_limit).is_ok());
    }

    #[test]
    fn test_undeclared_response_accepts_anything() {
        let registry = petstore().unwrap();
        let endpoint = registry.get("/store/order/{orderId}", HttpMethod::Delete).unwrap();
        assert!(check_response(&registry, endpoint, None).is_ok());
        assert!(check_response(&registry, endpoint, Some(&json!(""))).is_ok());
    }

    #[test]
    fn test_declared_response_requires_body() {
        let registry = petstore().unwrap();
        let endpoint = registry.get("/pet/{petId}", HttpMethod::Get).unwrap();
        let err = check_response(&registry, endpoint, None).unwrap_err();
        assert!(matches!(err, SchemaError::ShapeMismatch { .. }));
        assert!(err.to_string().contains("GET /pet/{petId}"));
    }

    #[test]
    fn test_opaque_inventory() {
        let registry = petstore().unwrap();
        let endpoint = registry.get("/store/inventory", HttpMethod::Get).unwrap();
        assert!(check_response(&registry, endpoint, Some(&json!({ "available": 7 }))).is_ok());
        assert!(check_response(&registry, endpoint, Some(&json!({}))).is_ok());
        assert!(check_response(&registry, endpoint, Some(&json!([1]))).is_err());
    }
}
