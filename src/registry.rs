//! Schema Registry
//!
//! A flat table of endpoints keyed by (path template, HTTP method) plus the
//! record shapes those endpoints refer to. Registries are assembled through
//! [`RegistryBuilder`], which validates every cross-reference, and are
//! immutable afterwards.

use std::collections::{BTreeMap, HashMap};

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::endpoint::{Endpoint, EndpointKey, HttpMethod, ParamLocation};
use crate::error::{Result, SchemaError};
use crate::fingerprint::Fingerprint;
use crate::request::RequestBuilder;
use crate::schema::{RecordShape, TypeRef};

/// Maximum number of "did you mean" suggestions on a failed lookup
const MAX_SUGGESTIONS: usize = 3;

/// Descriptive metadata of the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub title: String,
    pub version: Version,
}

impl ApiInfo {
    pub fn new(title: impl Into<String>, version: Version) -> Self {
        Self {
            title: title.into(),
            version,
        }
    }
}

/// A matched concrete request path
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub endpoint: &'a Endpoint,
    /// Decoded placeholder values
    pub path_params: BTreeMap<String, String>,
}

/// The main schema registry
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    info: ApiInfo,
    /// Record shapes in declaration order
    records: Vec<RecordShape>,
    /// Record name -> index into `records`
    record_index: HashMap<String, usize>,
    /// Endpoint table
    endpoints: BTreeMap<EndpointKey, Endpoint>,
}

/// Serialized form of a registry
#[derive(Serialize)]
struct RegistryDocument<'a> {
    info: &'a ApiInfo,
    records: &'a [RecordShape],
    endpoints: Vec<&'a Endpoint>,
}

impl SchemaRegistry {
    /// Start building a registry
    pub fn builder(info: ApiInfo) -> RegistryBuilder {
        RegistryBuilder::new(info)
    }

    pub fn info(&self) -> &ApiInfo {
        &self.info
    }

    /// Whether the API version satisfies a requirement such as `^1.0`
    pub fn satisfies(&self, requirement: &VersionReq) -> bool {
        requirement.matches(&self.info.version)
    }

    /// Parse `requirement` and check the API version against it
    pub fn satisfies_str(&self, requirement: &str) -> Result<bool> {
        let requirement = VersionReq::parse(requirement)?;
        Ok(self.satisfies(&requirement))
    }

    /// All record shapes, in declaration order
    pub fn records(&self) -> &[RecordShape] {
        &self.records
    }

    /// Get a record shape by name
    pub fn record(&self, name: &str) -> Option<&RecordShape> {
        self.record_index.get(name).map(|&i| &self.records[i])
    }

    /// Get a record shape by name, failing if it is not declared
    pub fn require_record(&self, name: &str) -> Result<&RecordShape> {
        self.record(name)
            .ok_or_else(|| SchemaError::RecordNotFound(name.to_string()))
    }

    /// All endpoints, ordered by path template then method
    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.values()
    }

    /// Number of declared endpoints
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    /// Distinct path templates, in table order
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = Vec::new();
        for key in self.endpoints.keys() {
            if paths.last() != Some(&key.path.as_str()) {
                paths.push(&key.path);
            }
        }
        paths
    }

    /// Look up an endpoint by path template and method
    pub fn get(&self, path: &str, method: HttpMethod) -> Option<&Endpoint> {
        self.endpoints.get(&EndpointKey::new(path, method))
    }

    /// Look up an endpoint, failing with suggestions when it is not declared
    pub fn endpoint(&self, path: &str, method: HttpMethod) -> Result<&Endpoint> {
        self.get(path, method).ok_or_else(|| {
            let suggestions = self
                .suggest(&format!("{} {}", method, path))
                .into_iter()
                .map(|key| key.to_string())
                .collect();
            SchemaError::EndpointNotFound {
                method,
                path: path.to_string(),
                suggestions,
            }
        })
    }

    /// Methods declared for a path template
    pub fn methods(&self, path: &str) -> Vec<HttpMethod> {
        self.endpoints
            .keys()
            .filter(|k| k.path == path)
            .map(|k| k.method)
            .collect()
    }

    /// Look up an endpoint by its operation id
    pub fn by_operation_id(&self, operation_id: &str) -> Result<&Endpoint> {
        self.endpoints()
            .find(|e| e.operation_id.as_deref() == Some(operation_id))
            .ok_or_else(|| SchemaError::OperationNotFound(operation_id.to_string()))
    }

    /// Find the endpoint serving a concrete request path.
    ///
    /// When several templates match, the one with more literal segments wins,
    /// so `/pet/findByStatus` never resolves to `/pet/{petId}`.
    pub fn resolve(&self, concrete_path: &str, method: HttpMethod) -> Option<RouteMatch<'_>> {
        let found = self
            .endpoints()
            .filter(|e| e.method == method)
            .filter_map(|e| e.path.matches(concrete_path).map(|params| (e, params)))
            .max_by_key(|(e, _)| e.path.specificity())
            .map(|(endpoint, path_params)| RouteMatch {
                endpoint,
                path_params,
            });

        match &found {
            Some(m) => tracing::debug!(path = concrete_path, endpoint = %m.endpoint, "resolved route"),
            None => tracing::debug!(path = concrete_path, %method, "no route matched"),
        }
        found
    }

    /// Endpoint keys that fuzzily resemble `query`, best first
    pub fn suggest(&self, query: &str) -> Vec<&EndpointKey> {
        let matcher = SkimMatcherV2::default();
        let mut scored: Vec<(i64, &EndpointKey)> = self
            .endpoints
            .keys()
            .filter_map(|key| {
                matcher
                    .fuzzy_match(&key.to_string(), query)
                    .map(|score| (score, key))
            })
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored
            .into_iter()
            .take(MAX_SUGGESTIONS)
            .map(|(_, key)| key)
            .collect()
    }

    /// Start preparing a request against an endpoint
    pub fn request(&self, path: &str, method: HttpMethod) -> Result<RequestBuilder<'_>> {
        let endpoint = self.endpoint(path, method)?;
        Ok(RequestBuilder::new(self, endpoint))
    }

    /// Canonical JSON form of the whole registry
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let doc = RegistryDocument {
            info: &self.info,
            records: &self.records,
            endpoints: self.endpoints.values().collect(),
        };
        Ok(serde_json::to_value(doc)?)
    }

    /// SHA-256 fingerprint of the canonical JSON form
    pub fn fingerprint(&self) -> Result<Fingerprint> {
        Ok(Fingerprint::of_json(&self.to_json()?))
    }
}

/// Assembles and validates a [`SchemaRegistry`]
#[derive(Debug)]
pub struct RegistryBuilder {
    info: ApiInfo,
    records: Vec<RecordShape>,
    endpoints: Vec<Endpoint>,
}

impl RegistryBuilder {
    pub fn new(info: ApiInfo) -> Self {
        Self {
            info,
            records: Vec::new(),
            endpoints: Vec::new(),
        }
    }

    /// Declare a record shape
    pub fn record(mut self, shape: RecordShape) -> Self {
        self.records.push(shape);
        self
    }

    /// Declare several record shapes
    pub fn records(mut self, shapes: impl IntoIterator<Item = RecordShape>) -> Self {
        self.records.extend(shapes);
        self
    }

    /// Declare an endpoint
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        self.endpoints.push(endpoint);
        self
    }

    /// Validate every declaration and freeze the registry
    pub fn build(self) -> Result<SchemaRegistry> {
        let mut record_index = HashMap::new();
        for (i, shape) in self.records.iter().enumerate() {
            if record_index.insert(shape.name.clone(), i).is_some() {
                return Err(SchemaError::DuplicateRecord(shape.name.clone()));
            }
        }

        for shape in &self.records {
            for field in &shape.fields {
                check_reference(&record_index, &field.type_ref, || {
                    format!("{}.{}", shape.name, field.name)
                })?;
            }
        }

        let mut endpoints = BTreeMap::new();
        for endpoint in self.endpoints {
            validate_endpoint(&record_index, &endpoint)?;
            let key = endpoint.key();
            if endpoints.contains_key(&key) {
                return Err(SchemaError::DuplicateEndpoint {
                    method: key.method,
                    path: key.path,
                });
            }
            endpoints.insert(key, endpoint);
        }

        tracing::debug!(
            records = self.records.len(),
            endpoints = endpoints.len(),
            "built schema registry"
        );

        Ok(SchemaRegistry {
            info: self.info,
            records: self.records,
            record_index,
            endpoints,
        })
    }
}

fn check_reference(
    index: &HashMap<String, usize>,
    type_ref: &TypeRef,
    referenced_by: impl FnOnce() -> String,
) -> Result<()> {
    match type_ref.record_name() {
        Some(name) if !index.contains_key(name) => Err(SchemaError::UnknownRecord {
            name: name.to_string(),
            referenced_by: referenced_by(),
        }),
        _ => Ok(()),
    }
}

fn validate_endpoint(index: &HashMap<String, usize>, endpoint: &Endpoint) -> Result<()> {
    let mismatch = |reason: String| SchemaError::PathParamMismatch {
        method: endpoint.method,
        path: endpoint.path.to_string(),
        reason,
    };

    for (i, param) in endpoint.params.iter().enumerate() {
        let repeated = endpoint.params[..i]
            .iter()
            .any(|p| p.name == param.name && p.location == param.location);
        if repeated {
            return Err(SchemaError::DuplicateParameter {
                method: endpoint.method,
                path: endpoint.path.to_string(),
                name: param.name.clone(),
                location: param.location,
            });
        }
        check_reference(index, &param.type_ref, || {
            format!("{} parameter '{}' of {}", param.location, param.name, endpoint)
        })?;
    }

    let placeholders = endpoint.path.param_names();
    for name in &placeholders {
        match endpoint.find_param(name, ParamLocation::Path) {
            None => return Err(mismatch(format!("placeholder '{}' has no declared parameter", name))),
            Some(p) if !p.required => {
                return Err(mismatch(format!("path parameter '{}' must be required", name)))
            }
            Some(p) if !p.type_ref.is_scalar() => {
                return Err(mismatch(format!("path parameter '{}' must be a scalar", name)))
            }
            Some(_) => {}
        }
    }
    for param in endpoint.params_in(ParamLocation::Path) {
        if !placeholders.contains(&param.name) {
            return Err(mismatch(format!(
                "path parameter '{}' does not appear in the template",
                param.name
            )));
        }
    }

    if let Some(body) = &endpoint.request_body {
        check_reference(index, body, || format!("request body of {}", endpoint))?;
    }
    if let Some(response) = &endpoint.response {
        check_reference(index, response, || format!("response of {}", endpoint))?;
    }
    Ok(())
}
