//! TypeScript Emitter
//!
//! One `export interface` per record, in declaration order, followed by a
//! `paths` interface keyed by path template and lowercase method:
//!
//! ```text
//! export interface paths {
//!   "/pet/{petId}": {
//!     get: {
//!       Parameters: {
//!         Path: {
//!           petId: number;
//!         };
//!       };
//!       Response: Pet;
//!     };
//!   };
//! }
//! ```
//!
//! Optional fields and parameters get a `?`. A method with nothing to declare
//! renders as `{}`, and so does an opaque object.

use crate::endpoint::{Endpoint, ParamDef, ParamLocation};
use crate::registry::SchemaRegistry;
use crate::schema::{RecordShape, TypeRef};

use super::RenderOptions;

/// Render the full declaration file
pub fn render(registry: &SchemaRegistry, options: &RenderOptions) -> String {
    let mut w = Writer::new(options.indent);

    let info = registry.info();
    w.line(&format!(
        "// Generated from {} {}. Do not edit by hand.",
        info.title, info.version
    ));
    w.blank();

    for shape in registry.records() {
        emit_record(&mut w, shape, options);
        w.blank();
    }

    w.open("export interface paths");
    for (path, endpoints) in group_by_path(registry) {
        w.open(&format!("\"{}\":", path));
        for (i, endpoint) in endpoints.iter().enumerate() {
            if i > 0 {
                w.blank();
            }
            emit_method(&mut w, endpoint, options);
        }
        w.close(";");
    }
    w.close("");

    w.finish()
}

/// TypeScript spelling of a type reference
pub fn ts_type(type_ref: &TypeRef) -> String {
    match type_ref {
        TypeRef::Integer => "number".to_string(),
        TypeRef::String => "string".to_string(),
        TypeRef::Boolean => "boolean".to_string(),
        TypeRef::Array { items } => format!("Array<{}>", ts_type(items)),
        TypeRef::Record { name } => name.clone(),
        TypeRef::OpaqueObject => "{}".to_string(),
    }
}

// =============================================================================
// Records
// =============================================================================

fn emit_record(w: &mut Writer, shape: &RecordShape, options: &RenderOptions) {
    w.open(&format!("export interface {}", shape.name));
    for (i, field) in shape.fields.iter().enumerate() {
        if i > 0 {
            w.blank();
        }
        if options.descriptions {
            if let Some(description) = &field.description {
                w.line(&format!("/** {} */", description));
            }
        }
        w.line(&format!(
            "{}{}: {};",
            field.name,
            optional_mark(field.required),
            ts_type(&field.type_ref)
        ));
    }
    w.close("");
}

// =============================================================================
// Paths
// =============================================================================

fn group_by_path(registry: &SchemaRegistry) -> Vec<(&str, Vec<&Endpoint>)> {
    let mut groups: Vec<(&str, Vec<&Endpoint>)> = Vec::new();
    for endpoint in registry.endpoints() {
        let path = endpoint.path.as_str();
        match groups.last_mut() {
            Some((current, members)) if *current == path => members.push(endpoint),
            _ => groups.push((path, vec![endpoint])),
        }
    }
    groups
}

fn emit_method(w: &mut Writer, endpoint: &Endpoint, options: &RenderOptions) {
    let method = endpoint.method.as_str().to_ascii_lowercase();

    if endpoint.params.is_empty() && endpoint.request_body.is_none() && endpoint.response.is_none() {
        w.line(&format!("{}: {{}};", method));
        return;
    }

    w.open(&format!("{}:", method));

    if !endpoint.params.is_empty() {
        w.open("Parameters:");
        for location in locations_in_order(endpoint) {
            w.open(&format!("{}:", location_title(location)));
            for (i, param) in endpoint.params_in(location).enumerate() {
                if i > 0 {
                    w.blank();
                }
                emit_param(w, param, options);
            }
            w.close(";");
        }
        w.close(";");
    }

    if let Some(body) = &endpoint.request_body {
        w.line(&format!("RequestBody: {};", ts_type(body)));
    }
    if let Some(response) = &endpoint.response {
        w.line(&format!("Response: {};", ts_type(response)));
    }

    w.close(";");
}

fn emit_param(w: &mut Writer, param: &ParamDef, options: &RenderOptions) {
    if options.descriptions {
        if let Some(description) = &param.description {
            w.line("/**");
            w.line(&format!(" * @description {}", description));
            w.line(" */");
        }
    }
    w.line(&format!(
        "{}{}: {};",
        param.name,
        optional_mark(param.required),
        ts_type(&param.type_ref)
    ));
}

/// Locations in the order their first parameter was declared
fn locations_in_order(endpoint: &Endpoint) -> Vec<ParamLocation> {
    let mut locations = Vec::new();
    for param in &endpoint.params {
        if !locations.contains(&param.location) {
            locations.push(param.location);
        }
    }
    locations
}

fn location_title(location: ParamLocation) -> &'static str {
    match location {
        ParamLocation::Path => "Path",
        ParamLocation::Query => "Query",
        ParamLocation::Header => "Header",
    }
}

fn optional_mark(required: bool) -> &'static str {
    if required {
        ""
    } else {
        "?"
    }
}

// =============================================================================
// Writer
// =============================================================================

/// Line writer that tracks brace depth
struct Writer {
    out: String,
    unit: String,
    depth: usize,
}

impl Writer {
    fn new(indent: usize) -> Self {
        Self {
            out: String::new(),
            unit: " ".repeat(indent),
            depth: 0,
        }
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str(&self.unit);
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn open(&mut self, head: &str) {
        self.line(&format!("{} {{", head));
        self.depth += 1;
    }

    fn close(&mut self, tail: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("}}{}", tail));
    }

    fn finish(self) -> String {
        self.out
    }
}
