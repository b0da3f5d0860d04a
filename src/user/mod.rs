mod repository;
mod service;

pub use repository::*;
pub use service::*;

use std::borrow::Cow;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// User as saved on database, addresses included.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    #[schema(example = "John")]
    pub name: String,
    #[schema(example = "Doe")]
    pub lastname: String,
    #[schema(example = "123.456.789-00")]
    pub cpf: String,
    pub birth_date: NaiveDate,
    #[sqlx(json)]
    pub addresses: Vec<Address>,
}

/// Address owned by exactly one [`User`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: i32,
    pub street: String,
    pub additional: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub user_id: i32,
}

/// Address shape accepted on input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct NewAddress {
    #[schema(example = "123 Main St")]
    #[validate(
        length(min = 1, message = "street must not be empty"),
        custom(function = "crate::user::validate_text")
    )]
    pub street: String,
    #[schema(example = "Apt 4B")]
    #[validate(
        length(min = 1, message = "additional must not be empty"),
        custom(function = "crate::user::validate_text")
    )]
    pub additional: String,
    #[schema(example = "New York")]
    #[validate(
        length(min = 1, message = "city must not be empty"),
        custom(function = "crate::user::validate_text")
    )]
    pub city: String,
    #[schema(example = "NY")]
    #[validate(
        length(min = 1, message = "state must not be empty"),
        custom(function = "crate::user::validate_text")
    )]
    pub state: String,
    #[schema(example = "10001")]
    #[validate(
        length(min = 1, message = "zip must not be empty"),
        custom(function = "crate::user::validate_text")
    )]
    pub zip: String,
}

impl NewAddress {
    /// Attach database identifiers to this address.
    pub fn persisted(self, id: i32, user_id: i32) -> Address {
        Address {
            id,
            street: self.street,
            additional: self.additional,
            city: self.city,
            state: self.state,
            zip: self.zip,
            user_id,
        }
    }
}

/// Reject text PostgreSQL cannot store.
pub fn validate_text(value: &str) -> Result<(), ValidationError> {
    if value.contains('\0') {
        return Err(ValidationError::new("nul_byte")
            .with_message(Cow::Borrowed("must not contain NUL characters")));
    }

    Ok(())
}

/// Validated input for user creation.
#[derive(Clone, Debug, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub lastname: String,
    pub cpf: String,
    pub birth_date: NaiveDate,
    pub addresses: Vec<NewAddress>,
}

/// Partial update of a [`User`].
///
/// `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub lastname: Option<String>,
    pub cpf: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub addresses: Option<Vec<NewAddress>>,
}
