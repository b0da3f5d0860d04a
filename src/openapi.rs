//! OpenAPI document for the HTTP API.

use axum::Json;
use utoipa::OpenApi;

use crate::error::ResponseError;
use crate::router::{status, user};
use crate::user::{Address, NewAddress, User};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Registry API",
        description = "Users and their addresses.",
        license(name = "MPL")
    ),
    paths(
        user::create::handler,
        user::get::handler,
        user::update::handler,
        user::delete::handler,
        status::status,
    ),
    components(schemas(User, Address, NewAddress, ResponseError)),
    tags(
        (name = "user", description = "User management"),
        (name = "status", description = "Server status")
    )
)]
pub struct ApiDoc;

/// Serve the generated document.
pub async fn handler() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
