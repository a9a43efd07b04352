//! Catalog Tests
//!
//! Checks the published Petstore contract end to end: record fields, the
//! endpoint table, absent-versus-empty handling and request assembly.

use petstore_schemas::conformance::{check_request_body, check_response, check_value};
use petstore_schemas::models::{Order, Pet, User};
use petstore_schemas::{
    petstore, HttpMethod, Inventory, ParamLocation, SchemaError, SchemaRegistry, TypeRef,
};
use url::Url;

fn registry() -> SchemaRegistry {
    petstore().unwrap()
}

fn fixture(name: &str) -> serde_json::Value {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// =============================================================================
// Record Shapes
// =============================================================================

#[test]
fn test_record_fields_and_required_flags() {
    let registry = registry();
    let expected: &[(&str, &[(&str, bool)])] = &[
        (
            "Order",
            &[
                ("id", false),
                ("petId", false),
                ("quantity", false),
                ("shipDate", false),
                ("status", false),
                ("complete", false),
            ],
        ),
        ("Customer", &[("id", false), ("username", false), ("address", false)]),
        (
            "Address",
            &[("street", false), ("city", false), ("state", false), ("zip", false)],
        ),
        ("Category", &[("id", false), ("name", false)]),
        (
            "User",
            &[
                ("id", false),
                ("username", false),
                ("firstName", false),
                ("lastName", false),
                ("email", false),
                ("password", false),
                ("phone", false),
                ("userStatus", false),
            ],
        ),
        ("Tag", &[("id", false), ("name", false)]),
        (
            "Pet",
            &[
                ("id", false),
                ("name", true),
                ("category", false),
                ("photoUrls", true),
                ("tags", false),
                ("status", false),
            ],
        ),
        ("ApiResponse", &[("code", false), ("type", false), ("message", false)]),
    ];

    assert_eq!(registry.records().len(), expected.len());
    for (name, fields) in expected {
        let shape = registry.require_record(name).unwrap();
        let actual: Vec<(&str, bool)> = shape
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.required))
            .collect();
        assert_eq!(&actual, fields, "fields of {}", name);
    }
}

#[test]
fn test_nested_field_types() {
    let registry = registry();
    let pet = registry.require_record("Pet").unwrap();
    assert_eq!(pet.field("category").unwrap().type_ref, TypeRef::record("Category"));
    assert_eq!(pet.field("tags").unwrap().type_ref.to_string(), "[Tag]");
    assert_eq!(pet.field("photoUrls").unwrap().type_ref.to_string(), "[string]");

    let customer = registry.require_record("Customer").unwrap();
    assert_eq!(customer.field("address").unwrap().type_ref.to_string(), "[Address]");

    let order = registry.require_record("Order").unwrap();
    assert_eq!(order.field("complete").unwrap().type_ref, TypeRef::Boolean);
}

// =============================================================================
// Endpoint Table
// =============================================================================

type Param = (&'static str, ParamLocation, &'static str, bool);

#[test]
fn test_endpoint_table() {
    use HttpMethod::*;
    use ParamLocation::{Header, Path, Query};

    let table: &[(&str, HttpMethod, &[Param], Option<&str>, Option<&str>)] = &[
        ("/pet", Post, &[], Some("Pet"), Some("Pet")),
        ("/pet/findByStatus", Get, &[("status", Query, "string", false)], None, Some("[Pet]")),
        ("/pet/findByTags", Get, &[("tags", Query, "[string]", false)], None, Some("[Pet]")),
        ("/pet/{petId}", Get, &[("petId", Path, "integer", true)], None, Some("Pet")),
        (
            "/pet/{petId}",
            Post,
            &[
                ("name", Query, "string", false),
                ("status", Query, "string", false),
                ("petId", Path, "integer", true),
            ],
            None,
            None,
        ),
        (
            "/pet/{petId}",
            Delete,
            &[("petId", Path, "integer", true), ("petId", Header, "integer", true)],
            None,
            None,
        ),
        (
            "/pet/{petId}/uploadImage",
            Post,
            &[
                ("additionalMetadata", Query, "string", false),
                ("petId", Path, "integer", true),
            ],
            None,
            Some("ApiResponse"),
        ),
        ("/store/inventory", Get, &[], None, Some("object")),
        ("/store/order", Post, &[], Some("Order"), Some("Order")),
        ("/store/order/{orderId}", Get, &[("orderId", Path, "integer", true)], None, Some("Order")),
        ("/store/order/{orderId}", Delete, &[("orderId", Path, "integer", true)], None, None),
        ("/user", Post, &[], Some("User"), None),
        ("/user/createWithList", Post, &[], Some("[User]"), Some("User")),
        (
            "/user/login",
            Get,
            &[("username", Query, "string", false), ("password", Query, "string", false)],
            None,
            Some("string"),
        ),
        ("/user/logout", Get, &[], None, None),
        ("/user/{username}", Get, &[("username", Path, "string", true)], None, Some("User")),
        ("/user/{username}", Delete, &[("username", Path, "string", true)], None, None),
    ];

    let registry = registry();
    assert_eq!(registry.endpoint_count(), table.len());

    for (path, method, params, request_body, response) in table {
        let endpoint = registry.endpoint(path, *method).unwrap();
        let actual: Vec<(&str, ParamLocation, String, bool)> = endpoint
            .params
            .iter()
            .map(|p| (p.name.as_str(), p.location, p.type_ref.to_string(), p.required))
            .collect();
        let expected: Vec<(&str, ParamLocation, String, bool)> = params
            .iter()
            .map(|(n, l, t, r)| (*n, *l, t.to_string(), *r))
            .collect();
        assert_eq!(actual, expected, "params of {} {}", method, path);
        assert_eq!(
            endpoint.request_body.as_ref().map(ToString::to_string).as_deref(),
            *request_body,
            "request body of {} {}",
            method,
            path
        );
        assert_eq!(
            endpoint.response.as_ref().map(ToString::to_string).as_deref(),
            *response,
            "response of {} {}",
            method,
            path
        );
    }
}

#[test]
fn test_undeclared_endpoint_suggests_neighbours() {
    let registry = registry();
    let err = registry.endpoint("/pet/{id}", HttpMethod::Get).unwrap_err();
    match err {
        SchemaError::EndpointNotFound { suggestions, .. } => {
            assert!(suggestions.iter().any(|s| s == "GET /pet/{petId}"));
        }
        other => panic!("Expected EndpointNotFound, got {:?}", other),
    }
    assert!(registry.get("/pet", HttpMethod::Put).is_none());
}

#[test]
fn test_resolve_concrete_paths() {
    let registry = registry();

    let matched = registry.resolve("/pet/findByStatus", HttpMethod::Get).unwrap();
    assert_eq!(matched.endpoint.path.as_str(), "/pet/findByStatus");
    assert!(matched.path_params.is_empty());

    let matched = registry.resolve("/user/john%20doe", HttpMethod::Delete).unwrap();
    assert_eq!(matched.endpoint.path.as_str(), "/user/{username}");
    assert_eq!(matched.path_params["username"], "john doe");

    assert!(registry.resolve("/store/order/3", HttpMethod::Put).is_none());
}

// =============================================================================
// Absent Versus Empty
// =============================================================================

#[test]
fn test_absent_and_empty_both_decode_and_stay_distinct() {
    let sparse: Order = serde_json::from_value(fixture("order_sparse.json")).unwrap();
    let empty: Order = serde_json::from_value(fixture("order_empty_values.json")).unwrap();

    assert_eq!(sparse.ship_date, None);
    assert_eq!(empty.ship_date, Some(String::new()));
    assert_eq!(sparse.quantity, None);
    assert_eq!(empty.quantity, Some(0));
    assert_ne!(sparse, empty);

    let registry = registry();
    let order = TypeRef::record("Order");
    assert!(check_value(&registry, &order, &fixture("order_sparse.json")).is_empty());
    assert!(check_value(&registry, &order, &fixture("order_empty_values.json")).is_empty());
}

#[test]
fn test_sparse_order_serializes_sparse() {
    let sparse: Order = serde_json::from_value(fixture("order_sparse.json")).unwrap();
    assert_eq!(serde_json::to_value(&sparse).unwrap(), fixture("order_sparse.json"));
}

#[test]
fn test_pet_fixture_round_trips() {
    let pet: Pet = serde_json::from_value(fixture("pet.json")).unwrap();
    assert_eq!(pet.name, "doggie");
    assert_eq!(pet.tags.as_ref().unwrap()[0].name.as_deref(), Some("friendly"));
    assert_eq!(serde_json::to_value(&pet).unwrap(), fixture("pet.json"));
}

#[test]
fn test_pet_without_name_is_rejected() {
    assert!(serde_json::from_value::<Pet>(fixture("pet_missing_name.json")).is_err());

    let registry = registry();
    let endpoint = registry.endpoint("/pet", HttpMethod::Post).unwrap();
    let err = check_request_body(&registry, endpoint, Some(&fixture("pet_missing_name.json"))).unwrap_err();
    match err {
        SchemaError::ShapeMismatch { violations, .. } => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].path, "/name");
        }
        other => panic!("Expected ShapeMismatch, got {:?}", other),
    }
}

#[test]
fn test_user_list_and_inventory() {
    let users: Vec<User> = serde_json::from_value(fixture("users.json")).unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].first_name, None);

    let inventory: Inventory = serde_json::from_value(fixture("inventory.json")).unwrap();
    assert_eq!(inventory["available"], 7);

    let registry = registry();
    let create = registry.endpoint("/user/createWithList", HttpMethod::Post).unwrap();
    assert!(check_request_body(&registry, create, Some(&fixture("users.json"))).is_ok());

    let inventory_endpoint = registry.endpoint("/store/inventory", HttpMethod::Get).unwrap();
    assert!(check_response(&registry, inventory_endpoint, Some(&fixture("inventory.json"))).is_ok());
}

// =============================================================================
// Requests
// =============================================================================

#[test]
fn test_find_by_status_without_status() {
    let registry = registry();
    let prepared = registry
        .request("/pet/findByStatus", HttpMethod::Get)
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(prepared.path, "/pet/findByStatus");
    assert!(prepared.query.is_empty());
}

#[test]
fn test_bodyless_endpoints_accept_missing_or_empty_bodies() {
    let registry = registry();

    let update = registry.endpoint("/pet/{petId}", HttpMethod::Post).unwrap();
    let delete_order = registry.endpoint("/store/order/{orderId}", HttpMethod::Delete).unwrap();
    for endpoint in [update, delete_order] {
        assert!(check_response(&registry, endpoint, None).is_ok());
        assert!(check_response(&registry, endpoint, Some(&serde_json::json!(""))).is_ok());
        assert!(check_response(&registry, endpoint, Some(&serde_json::json!({}))).is_ok());
    }

    let prepared = registry
        .request("/pet/{petId}", HttpMethod::Post)
        .unwrap()
        .path_param("petId", 3)
        .query("status", "sold")
        .build()
        .unwrap();
    assert_eq!(prepared.query, vec![("status".to_string(), "sold".to_string())]);
    assert!(prepared.body.is_none());
}

#[test]
fn test_delete_pet_carries_pet_id_twice() {
    let registry = registry();
    let prepared = registry
        .request("/pet/{petId}", HttpMethod::Delete)
        .unwrap()
        .path_param("petId", 10)
        .header("petId", 10)
        .build()
        .unwrap();
    assert_eq!(prepared.path, "/pet/10");
    assert_eq!(prepared.headers, vec![("petId".to_string(), "10".to_string())]);

    // Either half alone is incomplete
    let err = registry
        .request("/pet/{petId}", HttpMethod::Delete)
        .unwrap()
        .path_param("petId", 10)
        .build()
        .unwrap_err();
    assert!(matches!(
        err,
        SchemaError::MissingParameter { location: ParamLocation::Header, .. }
    ));
}

#[test]
fn test_add_pet_request_url() {
    let registry = registry();
    let pet: Pet = serde_json::from_value(fixture("pet.json")).unwrap();
    let prepared = registry
        .request("/pet", HttpMethod::Post)
        .unwrap()
        .body(&pet)
        .unwrap()
        .build()
        .unwrap();

    let base = Url::parse("https://petstore3.swagger.io/api/v3").unwrap();
    assert_eq!(
        prepared.url(&base).unwrap().as_str(),
        "https://petstore3.swagger.io/api/v3/pet"
    );
    assert_eq!(prepared.body, Some(fixture("pet.json")));
}

#[test]
fn test_find_by_tags_repeats_key() {
    let registry = registry();
    let prepared = registry
        .request("/pet/findByTags", HttpMethod::Get)
        .unwrap()
        .query("tags", vec!["tag1", "tag2"])
        .build()
        .unwrap();
    let base = Url::parse("https://petstore3.swagger.io/api/v3/").unwrap();
    assert_eq!(
        prepared.url(&base).unwrap().as_str(),
        "https://petstore3.swagger.io/api/v3/pet/findByTags?tags=tag1&tags=tag2"
    );
}

#[test]
fn test_fingerprint_matches_catalog_json() {
    let registry = registry();
    let fingerprint = registry.fingerprint().unwrap();
    assert_eq!(fingerprint.as_str().len(), 64);
    assert!(fingerprint.matches_json(&registry.to_json().unwrap()));
    assert_eq!(fingerprint, petstore().unwrap().fingerprint().unwrap());
}
