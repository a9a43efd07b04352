//! Request preparation
//!
//! Turns an endpoint declaration plus caller-supplied values into a concrete
//! method, path, query, header set and JSON body. Nothing is sent: the
//! transport belongs to whoever consumes the [`PreparedRequest`].

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::conformance;
use crate::endpoint::{Endpoint, HttpMethod, ParamDef, ParamLocation};
use crate::error::{Result, SchemaError};
use crate::registry::SchemaRegistry;
use crate::schema::TypeRef;

/// A caller-supplied parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Integer(i64),
    Text(String),
    Boolean(bool),
    List(Vec<String>),
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Integer(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Integer(v.into())
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Boolean(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(v: Vec<String>) -> Self {
        ParamValue::List(v)
    }
}

impl From<Vec<&str>> for ParamValue {
    fn from(v: Vec<&str>) -> Self {
        ParamValue::List(v.into_iter().map(String::from).collect())
    }
}

impl ParamValue {
    /// Render as wire text, checked against the declared type
    fn render(&self, param: &ParamDef) -> Result<Vec<String>> {
        let invalid = |reason: String| SchemaError::InvalidParameter {
            name: param.name.clone(),
            reason,
        };

        match (&param.type_ref, self) {
            (TypeRef::Integer, ParamValue::Integer(v)) => Ok(vec![v.to_string()]),
            (TypeRef::Integer, ParamValue::Text(s)) => s
                .trim()
                .parse::<i64>()
                .map(|v| vec![v.to_string()])
                .map_err(|_| invalid(format!("'{}' is not an integer", s))),
            (TypeRef::Boolean, ParamValue::Boolean(v)) => Ok(vec![v.to_string()]),
            (TypeRef::Boolean, ParamValue::Text(s)) => match s.as_str() {
                "true" | "false" => Ok(vec![s.clone()]),
                _ => Err(invalid(format!("'{}' is not a boolean", s))),
            },
            (TypeRef::String, ParamValue::Text(s)) => Ok(vec![s.clone()]),
            (TypeRef::String, ParamValue::Integer(v)) => Ok(vec![v.to_string()]),
            (TypeRef::Array { items }, ParamValue::List(values)) if items.is_scalar() => {
                let item = ParamDef {
                    type_ref: (**items).clone(),
                    ..param.clone()
                };
                values
                    .iter()
                    .map(|v| ParamValue::Text(v.clone()).render(&item).map(|mut r| r.remove(0)))
                    .collect()
            }
            (TypeRef::Array { items }, single) if items.is_scalar() => {
                single.render(&ParamDef {
                    type_ref: (**items).clone(),
                    ..param.clone()
                })
            }
            (declared, _) => Err(invalid(format!("expected {}", declared))),
        }
    }
}

/// A fully assembled request, ready for a transport
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    /// Percent-encoded concrete path (e.g. `/pet/42`)
    pub path: String,
    /// Unencoded path segments
    #[serde(skip)]
    pub segments: Vec<String>,
    /// Query pairs in declaration order; sequences repeat their key
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl PreparedRequest {
    /// Absolute URL below `base`.
    ///
    /// The base URL's own path is kept, so `https://host/api/v3` plus
    /// `/pet/42` gives `https://host/api/v3/pet/42`.
    pub fn url(&self, base: &Url) -> Result<Url> {
        let mut url = base.clone();
        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| SchemaError::InvalidBaseUrl(base.to_string()))?
            .pop_if_empty()
            .extend(&self.segments);
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }
        Ok(url)
    }
}

/// Collects values for one endpoint and checks them on [`build`](Self::build)
#[derive(Debug)]
pub struct RequestBuilder<'a> {
    registry: &'a SchemaRegistry,
    endpoint: &'a Endpoint,
    values: BTreeMap<(ParamLocation, String), ParamValue>,
    body: Option<Value>,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(registry: &'a SchemaRegistry, endpoint: &'a Endpoint) -> Self {
        Self {
            registry,
            endpoint,
            values: BTreeMap::new(),
            body: None,
        }
    }

    pub fn endpoint(&self) -> &'a Endpoint {
        self.endpoint
    }

    /// Set a value for a parameter in `location`
    pub fn param(mut self, location: ParamLocation, name: &str, value: impl Into<ParamValue>) -> Self {
        self.values.insert((location, name.to_string()), value.into());
        self
    }

    pub fn path_param(self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.param(ParamLocation::Path, name, value)
    }

    pub fn query(self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.param(ParamLocation::Query, name, value)
    }

    pub fn header(self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.param(ParamLocation::Header, name, value)
    }

    /// Attach a JSON body
    pub fn body<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Attach an already decoded JSON body
    pub fn json_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Check every value against the declaration and assemble the request
    pub fn build(self) -> Result<PreparedRequest> {
        let endpoint = self.endpoint;

        for (location, name) in self.values.keys() {
            if endpoint.find_param(name, *location).is_none() {
                return Err(SchemaError::UnknownParameter {
                    name: name.clone(),
                    location: *location,
                });
            }
        }

        let mut path_values = BTreeMap::new();
        let mut query = Vec::new();
        let mut headers = Vec::new();

        for param in &endpoint.params {
            let Some(value) = self.values.get(&(param.location, param.name.clone())) else {
                if param.required {
                    return Err(SchemaError::MissingParameter {
                        name: param.name.clone(),
                        location: param.location,
                    });
                }
                continue;
            };

            let rendered = value.render(param)?;
            match param.location {
                ParamLocation::Path => {
                    let single = expect_single(param, rendered)?;
                    if single.is_empty() {
                        return Err(SchemaError::InvalidParameter {
                            name: param.name.clone(),
                            reason: "path parameters cannot be empty".to_string(),
                        });
                    }
                    path_values.insert(param.name.clone(), single);
                }
                ParamLocation::Header => {
                    let single = expect_single(param, rendered)?;
                    headers.push((param.name.clone(), single));
                }
                ParamLocation::Query => {
                    query.extend(rendered.into_iter().map(|v| (param.name.clone(), v)));
                }
            }
        }

        match (&endpoint.request_body, &self.body) {
            (Some(_), None) => {
                return Err(SchemaError::MissingBody {
                    method: endpoint.method,
                    path: endpoint.path.to_string(),
                })
            }
            (None, Some(_)) => {
                return Err(SchemaError::UnexpectedBody {
                    method: endpoint.method,
                    path: endpoint.path.to_string(),
                })
            }
            (Some(_), Some(body)) => {
                conformance::check_request_body(self.registry, endpoint, Some(body))?
            }
            (None, None) => {}
        }

        let segments = endpoint.path.render_segments(&path_values)?;
        let path = endpoint.path.render(&path_values)?;

        tracing::debug!(endpoint = %endpoint, path = %path, "prepared request");

        Ok(PreparedRequest {
            method: endpoint.method,
            path,
            segments,
            query,
            headers,
            body: self.body,
        })
    }
}

fn expect_single(param: &ParamDef, mut rendered: Vec<String>) -> Result<String> {
    if rendered.len() == 1 {
        Ok(rendered.remove(0))
    } else {
        Err(SchemaError::InvalidParameter {
            name: param.name.clone(),
            reason: format!("{} parameters take exactly one value", param.location),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::petstore;
    use crate::models::{Order, Pet};

    #[test]
    fn test_get_pet_by_id() {
        let registry = petstore().unwrap();
        let req = registry
            .request("/pet/{petId}", HttpMethod::Get)
            .unwrap()
            .path_param("petId", 42)
            .build()
            .unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "/pet/42");
        assert!(req.query.is_empty());
        assert!(req.body.is_none());
    }

    #[test]
    fn test_integer_path_param_from_text() {
        let registry = petstore().unwrap();
        let req = registry
            .request("/store/order/{orderId}", HttpMethod::Delete)
            .unwrap()
            .path_param("orderId", "7")
            .build()
            .unwrap();
        assert_eq!(req.path, "/store/order/7");

        let err = registry
            .request("/store/order/{orderId}", HttpMethod::Delete)
            .unwrap()
            .path_param("orderId", "seven")
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidParameter { .. }));
    }

    #[test]
    fn test_missing_path_param() {
        let registry = petstore().unwrap();
        let err = registry
            .request("/user/{username}", HttpMethod::Get)
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingParameter { location: ParamLocation::Path, .. }));
    }

    #[test]
    fn test_empty_path_param_rejected() {
        let registry = petstore().unwrap();
        let err = registry
            .request("/user/{username}", HttpMethod::Delete)
            .unwrap()
            .path_param("username", "")
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidParameter { ref name, .. } if name == "username"));

        // Empty query values are still values
        let req = registry
            .request("/user/login", HttpMethod::Get)
            .unwrap()
            .query("username", "")
            .build()
            .unwrap();
        assert_eq!(req.query, vec![("username".to_string(), String::new())]);
    }

    #[test]
    fn test_prepared_path_resolves_back() {
        let registry = petstore().unwrap();
        let req = registry
            .request("/user/{username}", HttpMethod::Delete)
            .unwrap()
            .path_param("username", "a b")
            .build()
            .unwrap();
        let route = registry.resolve(&req.path, HttpMethod::Delete).unwrap();
        assert_eq!(route.endpoint.path.as_str(), "/user/{username}");
        assert_eq!(route.path_params.get("username").map(String::as_str), Some("a b"));
    }

    #[test]
    fn test_undeclared_param_rejected() {
        let registry = petstore().unwrap();
        let err = registry
            .request("/user/logout", HttpMethod::Get)
            .unwrap()
            .query("force", true)
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownParameter { .. }));
    }

    #[test]
    fn test_tags_repeat_query_key() {
        let registry = petstore().unwrap();
        let req = registry
            .request("/pet/findByTags", HttpMethod::Get)
            .unwrap()
            .query("tags", vec!["tag1", "tag2"])
            .build()
            .unwrap();
        assert_eq!(
            req.query,
            vec![
                ("tags".to_string(), "tag1".to_string()),
                ("tags".to_string(), "tag2".to_string()),
            ]
        );
    }

    #[test]
    fn test_body_required_and_checked() {
        let registry = petstore().unwrap();
        let err = registry
            .request("/store/order", HttpMethod::Post)
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::MissingBody { .. }));

        let req = registry
            .request("/store/order", HttpMethod::Post)
            .unwrap()
            .body(&Order {
                pet_id: Some(198772),
                quantity: Some(7),
                ..Order::default()
            })
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(req.body, Some(serde_json::json!({ "petId": 198772, "quantity": 7 })));

        let err = registry
            .request("/pet", HttpMethod::Post)
            .unwrap()
            .json_body(serde_json::json!({ "name": "doggie" }))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_unexpected_body() {
        let registry = petstore().unwrap();
        let err = registry
            .request("/pet/{petId}", HttpMethod::Get)
            .unwrap()
            .path_param("petId", 1)
            .body(&Pet::new("doggie", vec![]))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnexpectedBody { .. }));
    }

    #[test]
    fn test_url_keeps_base_path() {
        let registry = petstore().unwrap();
        let req = registry
            .request("/user/login", HttpMethod::Get)
            .unwrap()
            .query("username", "user 1")
            .query("password", "p&ss")
            .build()
            .unwrap();
        let base = Url::parse("https://petstore3.swagger.io/api/v3/").unwrap();
        let url = req.url(&base).unwrap();
        assert_eq!(
            url.as_str(),
            "https://petstore3.swagger.io/api/v3/user/login?username=user+1&password=p%26ss"
        );
    }

    #[test]
    fn test_url_encodes_path_segments() {
        let registry = petstore().unwrap();
        let req = registry
            .request("/user/{username}", HttpMethod::Delete)
            .unwrap()
            .path_param("username", "a b")
            .build()
            .unwrap();
        assert_eq!(req.path, "/user/a%20b");
        let base = Url::parse("http://localhost:8080").unwrap();
        assert_eq!(req.url(&base).unwrap().as_str(), "http://localhost:8080/user/a%20b");
    }

    #[test]
    fn test_base_url_without_path_rejected() {
        let registry = petstore().unwrap();
        let req = registry
            .request("/user/logout", HttpMethod::Get)
            .unwrap()
            .build()
            .unwrap();
        let base = Url::parse("mailto:someone@example.com").unwrap();
        assert!(matches!(req.url(&base), Err(SchemaError::InvalidBaseUrl(_))));
    }
}
