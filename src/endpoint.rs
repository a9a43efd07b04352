//! Endpoint declarations
//!
//! An [`Endpoint`] is one (path template, HTTP method) pair together with the
//! shapes of its parameters, request body and response body.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::path::PathTemplate;
use crate::schema::TypeRef;

/// HTTP method of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Methods that carry no request body in this API
    pub fn is_bodyless(&self) -> bool {
        matches!(self, HttpMethod::Get | HttpMethod::Delete)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "PUT" => Ok(HttpMethod::Put),
            "POST" => Ok(HttpMethod::Post),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            _ => Err(SchemaError::InvalidMethod(s.to_string())),
        }
    }
}

/// Where a parameter travels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
        })
    }
}

/// A declared parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParamLocation,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Compound lookup key of the endpoint table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EndpointKey {
    pub path: String,
    pub method: HttpMethod,
}

impl EndpointKey {
    pub fn new(path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            path: path.into(),
            method,
        }
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// One endpoint declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub path: PathTemplate,
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<TypeRef>,
    /// `None` means no response shape is declared
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<TypeRef>,
}

impl Endpoint {
    /// Start a declaration with no parameters, body or response
    pub fn new(method: HttpMethod, path: PathTemplate) -> Self {
        Self {
            path,
            method,
            operation_id: None,
            params: Vec::new(),
            request_body: None,
            response: None,
        }
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    /// Add a parameter
    pub fn param(mut self, param: ParamDef) -> Self {
        self.params.push(param);
        self
    }

    /// Add a required path parameter
    pub fn path_param(self, name: &str, type_ref: TypeRef, description: &str) -> Self {
        self.declared(name, ParamLocation::Path, type_ref, true, description)
    }

    /// Add an optional query parameter
    pub fn query_param(self, name: &str, type_ref: TypeRef, description: &str) -> Self {
        self.declared(name, ParamLocation::Query, type_ref, false, description)
    }

    /// Add a required header parameter
    pub fn header_param(self, name: &str, type_ref: TypeRef, description: &str) -> Self {
        self.declared(name, ParamLocation::Header, type_ref, true, description)
    }

    pub fn request_body(mut self, body: TypeRef) -> Self {
        self.request_body = Some(body);
        self
    }

    pub fn response(mut self, response: TypeRef) -> Self {
        self.response = Some(response);
        self
    }

    fn declared(
        self,
        name: &str,
        location: ParamLocation,
        type_ref: TypeRef,
        required: bool,
        description: &str,
    ) -> Self {
        self.param(ParamDef {
            name: name.to_string(),
            location,
            type_ref,
            required,
            description: (!description.is_empty()).then(|| description.to_string()),
        })
    }

    /// Lookup key of this endpoint
    pub fn key(&self) -> EndpointKey {
        EndpointKey::new(self.path.as_str(), self.method)
    }

    /// Parameters declared in one location, in declaration order
    pub fn params_in(&self, location: ParamLocation) -> impl Iterator<Item = &ParamDef> {
        self.params.iter().filter(move |p| p.location == location)
    }

    /// Get a parameter by name and location
    pub fn find_param(&self, name: &str, location: ParamLocation) -> Option<&ParamDef> {
        self.params_in(location).find(|p| p.name == name)
    }

    /// Every record shape this endpoint refers to
    pub fn referenced_records(&self) -> Vec<&str> {
        self.params
            .iter()
            .map(|p| &p.type_ref)
            .chain(self.request_body.iter())
            .chain(self.response.iter())
            .filter_map(TypeRef::record_name)
            .collect()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}
