//! The Petstore catalog
//!
//! Record shapes come from the models; the endpoint table below is the whole
//! public contract of the API.

use semver::Version;

use crate::endpoint::{Endpoint, HttpMethod};
use crate::error::Result;
use crate::models::{self, ApiResponse, Order, Pet, User};
use crate::path::PathTemplate;
use crate::registry::{ApiInfo, SchemaRegistry};
use crate::schema::{Record, TypeRef};

pub const API_TITLE: &str = "Swagger Petstore";
pub const API_VERSION: Version = Version::new(1, 0, 0);

/// Build the Petstore registry
pub fn petstore() -> Result<SchemaRegistry> {
    let pet = || TypeRef::record(Pet::NAME);
    let order = || TypeRef::record(Order::NAME);
    let user = || TypeRef::record(User::NAME);

    let mut builder = SchemaRegistry::builder(ApiInfo::new(API_TITLE, API_VERSION))
        .records(models::all_shapes());

    let endpoints = vec![
        // Pets
        at(HttpMethod::Post, "/pet")?
            .operation_id("addPet")
            .request_body(pet())
            .response(pet()),
        at(HttpMethod::Get, "/pet/findByStatus")?
            .operation_id("findPetsByStatus")
            .query_param(
                "status",
                TypeRef::String,
                "Status values that need to be considered for filter",
            )
            .response(TypeRef::array_of(pet())),
        at(HttpMethod::Get, "/pet/findByTags")?
            .operation_id("findPetsByTags")
            .query_param("tags", TypeRef::array_of(TypeRef::String), "Tags to filter by")
            .response(TypeRef::array_of(pet())),
        at(HttpMethod::Get, "/pet/{petId}")?
            .operation_id("getPetById")
            .path_param("petId", TypeRef::Integer, "ID of pet to return")
            .response(pet()),
        at(HttpMethod::Post, "/pet/{petId}")?
            .operation_id("updatePetWithForm")
            .query_param("name", TypeRef::String, "Name of pet that needs to be updated")
            .query_param("status", TypeRef::String, "Status of pet that needs to be updated")
            .path_param("petId", TypeRef::Integer, "ID of pet that needs to be updated"),
        // The header duplicate of petId is part of the published API description
        at(HttpMethod::Delete, "/pet/{petId}")?
            .operation_id("deletePet")
            .path_param("petId", TypeRef::Integer, "Pet id to delete")
            .header_param("petId", TypeRef::Integer, "Pet id to delete"),
        at(HttpMethod::Post, "/pet/{petId}/uploadImage")?
            .operation_id("uploadFile")
            .query_param("additionalMetadata", TypeRef::String, "Additional Metadata")
            .path_param("petId", TypeRef::Integer, "ID of pet to update")
            .response(TypeRef::record(ApiResponse::NAME)),
        // Store
        at(HttpMethod::Get, "/store/inventory")?
            .operation_id("getInventory")
            .response(TypeRef::OpaqueObject),
        at(HttpMethod::Post, "/store/order")?
            .operation_id("placeOrder")
            .request_body(order())
            .response(order()),
        at(HttpMethod::Get, "/store/order/{orderId}")?
            .operation_id("getOrderById")
            .path_param("orderId", TypeRef::Integer, "ID of order that needs to be fetched")
            .response(order()),
        at(HttpMethod::Delete, "/store/order/{orderId}")?
            .operation_id("deleteOrder")
            .path_param("orderId", TypeRef::Integer, "ID of the order that needs to be deleted"),
        // Users
        at(HttpMethod::Post, "/user")?
            .operation_id("createUser")
            .request_body(user()),
        at(HttpMethod::Post, "/user/createWithList")?
            .operation_id("createUsersWithListInput")
            .request_body(TypeRef::array_of(user()))
            .response(user()),
        at(HttpMethod::Get, "/user/login")?
            .operation_id("loginUser")
            .query_param("username", TypeRef::String, "The user name for login")
            .query_param("password", TypeRef::String, "The password for login in clear text")
            .response(TypeRef::String),
        at(HttpMethod::Get, "/user/logout")?.operation_id("logoutUser"),
        at(HttpMethod::Get, "/user/{username}")?
            .operation_id("getUserByName")
            .path_param(
                "username",
                TypeRef::String,
                "The name that needs to be fetched. Use user1 for testing.",
            )
            .response(user()),
        at(HttpMethod::Delete, "/user/{username}")?
            .operation_id("deleteUser")
            .path_param("username", TypeRef::String, "The name that needs to be deleted"),
    ];

    for endpoint in endpoints {
        builder = builder.endpoint(endpoint);
    }
    builder.build()
}

fn at(method: HttpMethod, path: &str) -> Result<Endpoint> {
    Ok(Endpoint::new(method, PathTemplate::parse(path)?))
}
