use axum::extract::State;
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::AppState;
use crate::error::{ResponseError, Result};
use crate::router::Valid;
use crate::user::{NewAddress, NewUser};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[schema(as = CreateUser)]
pub struct Body {
    #[schema(example = "John")]
    #[validate(
        length(min = 1, message = "name must not be empty"),
        custom(function = "crate::user::validate_text")
    )]
    pub name: String,
    #[schema(example = "Doe")]
    #[validate(
        length(min = 1, message = "lastname must not be empty"),
        custom(function = "crate::user::validate_text")
    )]
    pub lastname: String,
    #[schema(example = "123.456.789-00")]
    #[validate(
        length(min = 1, message = "cpf must not be empty"),
        custom(function = "crate::user::validate_text")
    )]
    pub cpf: String,
    pub birth_date: NaiveDate,
    #[validate(nested)]
    pub addresses: Vec<NewAddress>,
}

impl From<Body> for NewUser {
    fn from(body: Body) -> Self {
        Self {
            name: body.name,
            lastname: body.lastname,
            cpf: body.cpf,
            birth_date: body.birth_date,
            addresses: body.addresses,
        }
    }
}

/// Handler to create user.
#[utoipa::path(
    post,
    path = "/user",
    tag = "user",
    request_body = Body,
    responses(
        (status = 201, description = "User created successfully"),
        (status = 400, description = "Invalid body or CPF already registered", body = ResponseError)
    )
)]
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<StatusCode> {
    state.users.create(body.into()).await?;

    Ok(StatusCode::CREATED)
}
