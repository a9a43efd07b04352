//! JSON Schema Emitter
//!
//! Produces draft-07 documents. Every record becomes an entry under
//! `definitions`; record references become `$ref`s into that map. Undeclared
//! fields stay allowed (no `additionalProperties: false`), matching the
//! structural checks in [`crate::conformance`].

use serde_json::{json, Map, Value};

use crate::registry::SchemaRegistry;
use crate::schema::{RecordShape, TypeRef};

use super::RenderOptions;

pub const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";

/// The whole catalog: metadata plus one definition per record
pub fn document(registry: &SchemaRegistry, options: &RenderOptions) -> Value {
    let info = registry.info();
    json!({
        "$schema": DRAFT_07,
        "title": info.title,
        "$comment": format!("{} {}", info.title, info.version),
        "definitions": definitions(registry, options),
    })
}

/// A standalone document validating a single value of `type_ref`.
///
/// The root applies the type through `allOf` so that `$ref` never sits next
/// to `definitions`.
pub fn schema_for(registry: &SchemaRegistry, type_ref: &TypeRef, options: &RenderOptions) -> Value {
    json!({
        "$schema": DRAFT_07,
        "definitions": definitions(registry, options),
        "allOf": [type_schema(type_ref)],
    })
}

/// Schema of one record shape
pub fn record_schema(shape: &RecordShape, options: &RenderOptions) -> Value {
    let mut properties = Map::new();
    for field in &shape.fields {
        let mut schema = type_schema(&field.type_ref);
        if options.descriptions {
            if let (Some(description), Value::Object(object)) = (&field.description, &mut schema) {
                object.insert("description".to_string(), Value::String(description.clone()));
            }
        }
        properties.insert(field.name.clone(), schema);
    }

    let mut schema = Map::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    let required = shape.required_fields();
    if !required.is_empty() {
        schema.insert("required".to_string(), json!(required));
    }
    Value::Object(schema)
}

/// Schema of a type reference
pub fn type_schema(type_ref: &TypeRef) -> Value {
    match type_ref {
        TypeRef::Integer => json!({ "type": "integer", "minimum": i64::MIN, "maximum": i64::MAX }),
        TypeRef::String => json!({ "type": "string" }),
        TypeRef::Boolean => json!({ "type": "boolean" }),
        TypeRef::Array { items } => json!({ "type": "array", "items": type_schema(items) }),
        TypeRef::Record { name } => json!({ "$ref": format!("#/definitions/{}", name) }),
        TypeRef::OpaqueObject => json!({ "type": "object" }),
    }
}

fn definitions(registry: &SchemaRegistry, options: &RenderOptions) -> Map<String, Value> {
    registry
        .records()
        .iter()
        .map(|shape| (shape.name.clone(), record_schema(shape, options)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::petstore;

    #[test]
    fn test_document_has_every_record() {
        let registry = petstore().unwrap();
        let doc = document(&registry, &RenderOptions::default());
        assert_eq!(doc["$schema"], DRAFT_07);
        assert_eq!(doc["title"], "Swagger Petstore");
        let definitions = doc["definitions"].as_object().unwrap();
        assert_eq!(definitions.len(), 8);
        assert!(definitions.contains_key("ApiResponse"));
    }

    #[test]
    fn test_pet_definition() {
        let registry = petstore().unwrap();
        let doc = document(&registry, &RenderOptions::default());
        let pet = &doc["definitions"]["Pet"];
        assert_eq!(pet["required"], json!(["name", "photoUrls"]));
        assert_eq!(pet["properties"]["category"], json!({ "$ref": "#/definitions/Category" }));
        assert_eq!(
            pet["properties"]["tags"],
            json!({ "type": "array", "items": { "$ref": "#/definitions/Tag" } })
        );
        assert_eq!(pet["properties"]["status"]["description"], "pet status in the store");
    }

    #[test]
    fn test_all_optional_record_has_no_required_list() {
        let registry = petstore().unwrap();
        let doc = document(&registry, &RenderOptions::default());
        assert!(doc["definitions"]["Order"].get("required").is_none());
    }

    #[test]
    fn test_descriptions_can_be_dropped() {
        let registry = petstore().unwrap();
        let options = RenderOptions {
            descriptions: false,
            ..RenderOptions::default()
        };
        let doc = document(&registry, &options);
        assert_eq!(doc["definitions"]["Order"]["properties"]["shipDate"], json!({ "type": "string" }));
    }

    #[test]
    fn test_schema_for_array_response() {
        let registry = petstore().unwrap();
        let schema = schema_for(
            &registry,
            &TypeRef::array_of(TypeRef::record("Pet")),
            &RenderOptions::default(),
        );
        assert_eq!(schema["allOf"][0]["type"], "array");
        assert!(schema["definitions"]["Pet"].is_object());
    }
}
