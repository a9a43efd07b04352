//! Petstore record models
//!
//! One struct per record shape. Every field that the shape does not mark as
//! required is an `Option` and is left out of the serialized form when unset,
//! so "absent" and "present but empty" never collapse into each other.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::schema::{FieldDef, Record, RecordShape, TypeRef};

/// Response body of `GET /store/inventory`.
///
/// The schema declares an object with no field structure, so it is kept as an
/// untyped JSON object.
pub type Inventory = serde_json::Map<String, serde_json::Value>;

// =============================================================================
// Store
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    /// Date-time in its textual form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ship_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete: Option<bool>,
}

impl Order {
    /// Parse `shipDate` as an RFC 3339 timestamp.
    ///
    /// Returns `Ok(None)` when the field is absent.
    pub fn ship_date_time(&self) -> Result<Option<DateTime<FixedOffset>>, chrono::ParseError> {
        self.ship_date
            .as_deref()
            .map(DateTime::parse_from_rfc3339)
            .transpose()
    }
}

impl Record for Order {
    const NAME: &'static str = "Order";

    fn shape() -> RecordShape {
        RecordShape::new(
            Self::NAME,
            vec![
                FieldDef::optional("id", TypeRef::Integer),
                FieldDef::optional("petId", TypeRef::Integer),
                FieldDef::optional("quantity", TypeRef::Integer),
                FieldDef::optional("shipDate", TypeRef::String)
                    .with_description("date-time"),
                FieldDef::optional("status", TypeRef::String),
                FieldDef::optional("complete", TypeRef::Boolean),
            ],
        )
    }
}

// =============================================================================
// Customers
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Vec<Address>>,
}

impl Record for Customer {
    const NAME: &'static str = "Customer";

    fn shape() -> RecordShape {
        RecordShape::new(
            Self::NAME,
            vec![
                FieldDef::optional("id", TypeRef::Integer),
                FieldDef::optional("username", TypeRef::String),
                FieldDef::optional("address", TypeRef::array_of(TypeRef::record(Address::NAME))),
            ],
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip: Option<String>,
}

impl Record for Address {
    const NAME: &'static str = "Address";

    fn shape() -> RecordShape {
        RecordShape::new(
            Self::NAME,
            vec![
                FieldDef::optional("street", TypeRef::String),
                FieldDef::optional("city", TypeRef::String),
                FieldDef::optional("state", TypeRef::String),
                FieldDef::optional("zip", TypeRef::String),
            ],
        )
    }
}

// =============================================================================
// Pets
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Record for Category {
    const NAME: &'static str = "Category";

    fn shape() -> RecordShape {
        RecordShape::new(
            Self::NAME,
            vec![
                FieldDef::optional("id", TypeRef::Integer),
                FieldDef::optional("name", TypeRef::String),
            ],
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Record for Tag {
    const NAME: &'static str = "Tag";

    fn shape() -> RecordShape {
        RecordShape::new(
            Self::NAME,
            vec![
                FieldDef::optional("id", TypeRef::Integer),
                FieldDef::optional("name", TypeRef::String),
            ],
        )
    }
}

/// A pet. `category` and `tags` are embedded copies, not links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub photo_urls: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    /// Free-form; not an enforced enumeration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Pet {
    /// Create a pet with only its required fields set
    pub fn new(name: impl Into<String>, photo_urls: Vec<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            category: None,
            photo_urls,
            tags: None,
            status: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

impl Record for Pet {
    const NAME: &'static str = "Pet";

    fn shape() -> RecordShape {
        RecordShape::new(
            Self::NAME,
            vec![
                FieldDef::optional("id", TypeRef::Integer),
                FieldDef::required("name", TypeRef::String),
                FieldDef::optional("category", TypeRef::record(Category::NAME)),
                FieldDef::required("photoUrls", TypeRef::array_of(TypeRef::String)),
                FieldDef::optional("tags", TypeRef::array_of(TypeRef::record(Tag::NAME))),
                FieldDef::optional("status", TypeRef::String)
                    .with_description("pet status in the store"),
            ],
        )
    }
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_status: Option<i64>,
}

impl Record for User {
    const NAME: &'static str = "User";

    fn shape() -> RecordShape {
        RecordShape::new(
            Self::NAME,
            vec![
                FieldDef::optional("id", TypeRef::Integer),
                FieldDef::optional("username", TypeRef::String),
                FieldDef::optional("firstName", TypeRef::String),
                FieldDef::optional("lastName", TypeRef::String),
                FieldDef::optional("email", TypeRef::String),
                FieldDef::optional("password", TypeRef::String),
                FieldDef::optional("phone", TypeRef::String),
                FieldDef::optional("userStatus", TypeRef::Integer)
                    .with_description("User Status"),
            ],
        )
    }
}

// =============================================================================
// Acknowledgements
// =============================================================================

/// Generic envelope for simple acknowledgements
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Record for ApiResponse {
    const NAME: &'static str = "ApiResponse";

    fn shape() -> RecordShape {
        RecordShape::new(
            Self::NAME,
            vec![
                FieldDef::optional("code", TypeRef::Integer),
                FieldDef::optional("type", TypeRef::String),
                FieldDef::optional("message", TypeRef::String),
            ],
        )
    }
}

/// Shapes of every record model, in declaration order
pub fn all_shapes() -> Vec<RecordShape> {
    vec![
        Order::shape(),
        Customer::shape(),
        Address::shape(),
        Category::shape(),
        User::shape(),
        Tag::shape(),
        Pet::shape(),
        ApiResponse::shape(),
    ]
}
