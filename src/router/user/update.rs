//! Partially update a user.

use axum::Json;
use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::AppState;
use crate::error::{ResponseError, Result};
use crate::router::{Valid, present};
use crate::user::{NewAddress, User, UserPatch};

/// Every key is optional. A key left out keeps the stored value, `null`
/// is rejected.
#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
#[schema(as = UpdateUser)]
pub struct Body {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, message = "name must not be empty"),
        custom(function = "crate::user::validate_text")
    )]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, message = "lastname must not be empty"),
        custom(function = "crate::user::validate_text")
    )]
    pub lastname: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[validate(
        length(min = 1, message = "cpf must not be empty"),
        custom(function = "crate::user::validate_text")
    )]
    pub cpf: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<NaiveDate>,
    /// Replaces every stored address when present.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub addresses: Option<Vec<NewAddress>>,
}

impl From<Body> for UserPatch {
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

#[utoipa::path(
    patch,
    path = "/user/{id}",
    tag = "user",
    params(("id" = i32, Path, description = "User identifier")),
    request_body = Body,
    responses(
        (status = 200, description = "User updated successfully", body = User),
        (status = 400, description = "Invalid body or identifier", body = ResponseError),
        (status = 404, description = "User not found", body = ResponseError)
    )
)]
pub async fn handler(
    State(state): State<AppState>,
    id: std::result::Result<Path<i32>, PathRejection>,
    Valid(body): Valid<Body>,
) -> Result<Json<User>> {
    let Path(id) = id?;
    let user = state.users.update(id, body.into()).await?;

    Ok(Json(user))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::json;
    use sqlx::{Pool, Postgres};

    use super::*;
    use crate::*;

    async fn patch(
        pool: Pool<Postgres>,
        path: &str,
        body: String,
    ) -> axum::http::Response<axum::body::Body> {
        make_request(app(router::state(pool)), Method::PATCH, path, body).await
    }

    async fn decode(response: axum::http::Response<axum::body::Body>) -> User {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_update_handler(pool: Pool<Postgres>) {
        let req_body = Body {
            lastname: Some("Updated".into()),
            birth_date: NaiveDate::from_ymd_opt(1991, 2, 3),
            ..Default::default()
        };
        let response = patch(pool, "/user/1", json!(req_body).to_string()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let user = decode(response).await;
        assert_eq!(user.name, "John");
        assert_eq!(user.lastname, "Updated");
        assert_eq!(user.birth_date, NaiveDate::from_ymd_opt(1991, 2, 3).unwrap());
        assert_eq!(user.addresses.len(), 2);
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_update_replaces_addresses(pool: Pool<Postgres>) {
        let req_body = json!({
            "addresses": [{
                "street": "1 New St",
                "additional": "Unit 9",
                "city": "Curitiba",
                "state": "PR",
                "zip": "80000",
            }],
        });
        let response = patch(pool.clone(), "/user/1", req_body.to_string()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let user = decode(response).await;
        assert_eq!(user.addresses.len(), 1);
        assert_eq!(user.addresses[0].city, "Curitiba");
        assert_eq!(user.addresses[0].user_id, 1);

        let response = patch(pool, "/user/1", json!({ "addresses": [] }).to_string()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(decode(response).await.addresses.is_empty());
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_update_unknown_user(pool: Pool<Postgres>) {
        let response = patch(pool, "/user/404", json!({ "name": "Ghost" }).to_string()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_update_rejects_invalid_input(pool: Pool<Postgres>) {
        let cases = [
            ("/user/1", json!({ "name": "" })),
            ("/user/1", json!({ "name": null })),
            ("/user/1", json!({ "addresses": null })),
            ("/user/1", json!({ "nickname": "JD" })),
            ("/user/1", json!({ "birthDate": "not-a-date" })),
            ("/user/1", json!({ "addresses": [{ "street": "" }] })),
            ("/user/1", json!({ "lastname": "Do\u{0}e" })),
            ("/user/1", json!({ "cpf": "\u{0}" })),
            ("/user/abc", json!({ "name": "Alex" })),
        ];

        for (path, req_body) in cases {
            let response = patch(pool.clone(), path, req_body.to_string()).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{path} {req_body}");
        }

        let response = make_request(
            app(router::state(pool)),
            Method::GET,
            "/user?cpf=12345678900",
            String::default(),
        )
        .await;
        let user = decode(response).await;
        assert_eq!(user.name, "John");
        assert_eq!(user.addresses.len(), 2);
    }

    #[sqlx::test(fixtures("../../../fixtures/users.sql"))]
    async fn test_update_to_taken_cpf(pool: Pool<Postgres>) {
        let response = patch(pool, "/user/3", json!({ "cpf": "12345678900" }).to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
