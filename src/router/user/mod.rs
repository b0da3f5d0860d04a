//! User-related HTTP API.
pub mod create;
pub mod delete;
pub mod get;
pub mod update;

use axum::Router;
use axum::routing::{patch, post};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        // `POST /user` goes to `create`, `GET /user?name=|cpf=` goes to `get`.
        .route("/", post(create::handler).get(get::handler))
        // `PATCH /user/:ID` goes to `update`, `DELETE /user/:ID` to `delete`.
        .route("/{id}", patch(update::handler).delete(delete::handler))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use sqlx::{Pool, Postgres};

    use crate::*;

    async fn body(response: axum::http::Response<axum::body::Body>) -> Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[sqlx::test]
    async fn test_user_lifecycle(pool: Pool<Postgres>) {
        let app = app(router::state(pool));
        let address = json!({
            "street": "123 Main St",
            "additional": "Apt 4B",
            "city": "New York",
            "state": "NY",
            "zip": "10001",
        });

        let response = make_request(
            app.clone(),
            Method::POST,
            "/user",
            json!({
                "name": "Alex Test",
                "lastname": "Doe",
                "cpf": "00000000000",
                "birthDate": "1990-01-01",
                "addresses": [address],
            })
            .to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = make_request(
            app.clone(),
            Method::GET,
            "/user?cpf=00000000000",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let user = body(response).await;
        assert_eq!(user["name"], "Alex Test");
        assert_eq!(user["birthDate"], "1990-01-01");
        assert_eq!(user["addresses"].as_array().unwrap().len(), 1);
        assert_eq!(user["addresses"][0]["street"], "123 Main St");
        assert_eq!(user["addresses"][0]["userId"], user["id"]);
        let id = user["id"].as_i64().unwrap();

        let response = make_request(
            app.clone(),
            Method::GET,
            "/user?name=Alex%20Test",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let users = body(response).await;
        assert_eq!(users.as_array().unwrap().len(), 1);
        assert_eq!(users[0]["id"], id);

        let response = make_request(
            app.clone(),
            Method::PATCH,
            &format!("/user/{id}"),
            json!({ "name": "Alex2" }).to_string(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated = body(response).await;
        assert_eq!(updated["name"], "Alex2");
        assert_eq!(updated["addresses"], user["addresses"]);

        let response = make_request(
            app.clone(),
            Method::DELETE,
            &format!("/user/{id}"),
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response).await["message"], super::delete::REMOVED);

        for path in ["/user?cpf=00000000000", "/user?name=Alex2"] {
            let response =
                make_request(app.clone(), Method::GET, path, String::default()).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{path}");
        }
    }
}
