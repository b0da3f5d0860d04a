//! Public server status.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::Configuration;
use crate::database::Database;

/// Structured status.
#[derive(Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Status {
    version: String,
    name: String,
    /// Whether PostgreSQL answered a ping.
    database: bool,
}

/// Instance name, version and database reachability.
#[utoipa::path(
    get,
    path = "/status.json",
    tag = "status",
    responses((status = 200, description = "Server status", body = Status))
)]
pub async fn status(
    State(config): State<Arc<Configuration>>,
    State(db): State<Database>,
) -> Json<Status> {
    let database = match sqlx::query("SELECT 1").execute(&db.postgres).await {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(error = %err, "database ping failed");
            false
        },
    };

    Json(Status {
        version: config.version().to_owned(),
        name: config.name.clone(),
        database,
    })
}
