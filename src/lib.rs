//! Petstore Schema Registry
//!
//! A declarative, strongly typed description of the Swagger Petstore REST API:
//! record shapes, the endpoint table, and the helpers that let an HTTP client,
//! a mock server or a code generator consume that table without
//! re-declaring it.
//!
//! ## Features
//!
//! - **Typed Records**: serde models for every record, with optional fields
//!   as `Option` so "absent" and "empty" never collapse
//! - **Endpoint Table**: one flat table keyed by (path template, method)
//! - **Request Preparation**: assemble path, query, headers and body from an
//!   endpoint declaration (no I/O)
//! - **Conformance**: structural checks of decoded JSON against a shape
//! - **Linting**: flags authoring inconsistencies without changing them
//! - **Export**: TypeScript declarations, JSON Schema, raw JSON, drift checks
//!
//! ## Example
//!
//! ```no_run
//! use petstore_schemas::{catalog, HttpMethod};
//!
//! let registry = catalog::petstore()?;
//! let prepared = registry
//!     .request("/pet/{petId}", HttpMethod::Delete)?
//!     .path_param("petId", 10)
//!     .header("petId", 10)
//!     .build()?;
//! assert_eq!(prepared.path, "/pet/10");
//! # Ok::<(), petstore_schemas::SchemaError>(())
//! ```

pub mod catalog;
pub mod codegen;
pub mod config;
pub mod conformance;
pub mod endpoint;
pub mod error;
pub mod fingerprint;
pub mod lint;
pub mod models;
pub mod path;
pub mod registry;
pub mod request;
pub mod schema;

pub use catalog::petstore;
pub use codegen::{GeneratedOutput, RenderOptions, Target};
pub use config::PetstoreConfig;
pub use conformance::Violation;
pub use endpoint::{Endpoint, EndpointKey, HttpMethod, ParamDef, ParamLocation};
pub use error::{Result, SchemaError};
pub use fingerprint::Fingerprint;
pub use lint::{LintResult, RegistryLinter};
pub use models::{Address, ApiResponse, Category, Customer, Inventory, Order, Pet, Tag, User};
pub use path::PathTemplate;
pub use registry::{ApiInfo, RouteMatch, SchemaRegistry};
pub use request::{ParamValue, PreparedRequest, RequestBuilder};
pub use schema::{FieldDef, Record, RecordShape, TypeRef};
