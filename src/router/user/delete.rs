//! Delete user and its addresses from database.

use axum::Json;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::AppState;
use crate::error::{ResponseError, Result};

pub const REMOVED: &str = "User removed successfully";

#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(as = RemovedUser)]
pub struct Response {
    #[schema(example = "User removed successfully")]
    pub message: String,
}

#[utoipa::path(
    delete,
    path = "/user/{id}",
    tag = "user",
    params(("id" = i32, Path, description = "User identifier")),
    responses(
        (status = 200, description = "User removed successfully", body = Response),
        (status = 400, description = "Invalid identifier", body = ResponseError),
        (status = 404, description = "User not found", body = ResponseError)
    )
)]
pub async fn handler(
    State(state): State<AppState>,
    id: std::result::Result<Path<i32>, PathRejection>,
) -> Result<Json<Response>> {
    let Path(id) = id?;
    state.users.remove(id).await?;

    Ok(Json(Response {
        message: REMOVED.to_owned(),
    }))
}
