//! Look users up by CPF or name.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::AppState;
use crate::ServerError;
use crate::error::{ResponseError, Result};
use crate::user::User;

#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Lookup {
    /// Exact name of the user.
    #[validate(custom(function = "crate::user::validate_text"))]
    name: Option<String>,
    /// CPF of the user, wins over `name`.
    #[validate(custom(function = "crate::user::validate_text"))]
    cpf: Option<String>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
#[schema(as = FoundUsers)]
pub enum Response {
    One(User),
    Many(Vec<User>),
}

#[utoipa::path(
    get,
    path = "/user",
    tag = "user",
    params(Lookup),
    responses(
        (status = 200, description = "User matching `cpf`, or users matching `name`", body = Response),
        (status = 400, description = "Neither `name` nor `cpf` provided, or invalid value", body = ResponseError),
        (status = 404, description = "User not found", body = ResponseError)
    )
)]
pub async fn handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<Lookup>, QueryRejection>,
) -> Result<Json<Response>> {
    let Query(lookup) = query?;
    lookup.validate()?;
    let cpf = lookup.cpf.filter(|cpf| !cpf.is_empty());
    let name = lookup.name.filter(|name| !name.is_empty());

    match (cpf, name) {
        (Some(cpf), _) => Ok(Json(Response::One(state.users.find_by_cpf(&cpf).await?))),
        (None, Some(name)) => Ok(Json(Response::Many(state.users.find_by_name(&name).await?))),
        (None, None) => Err(ServerError::MissingLookupKey),
    }
}
