//! Database pool and schema bootstrap.
use std::sync::LazyLock;

use axum::extract::FromRef;
use regex_lite::Regex;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Connection, Executor, PgConnection, PgPool, Postgres};
use thiserror::Error;

use crate::AppState;
use crate::config;

pub const DEFAULT_CREDENTIALS: &str = "postgres";
pub const DEFAULT_DATABASE_NAME: &str = "registry";
pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_POOL_SIZE: u32 = 10;

static SCHEMA_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("schema pattern must compile")
});

/// Failures preventing the service from starting.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("invalid schema name {0:?}")]
    InvalidSchema(String),

    #[error(transparent)]
    Sql(#[from] sqlx::Error),

    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Custom db structure to pass to Axum.
#[derive(Clone)]
pub struct Database {
    pub postgres: PgPool,
}

impl Database {
    /// Create the configured schema if absent, then open the pool and
    /// apply embedded migrations inside that schema.
    pub async fn new(config: &config::Postgres) -> Result<Self, BootstrapError> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.username)
            .password(&config.password)
            .database(&config.database);

        let mut conn = PgConnection::connect_with(&options).await?;
        ensure_schema(&mut conn, &config.schema).await?;
        conn.close().await?;

        let postgres = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .connect_with(options.options([("search_path", config.schema.as_str())]))
            .await?;

        tracing::info!(
            host = %config.host,
            db = %config.database,
            schema = %config.schema,
            "postgres connected"
        );

        sqlx::migrate!().run(&postgres).await?;

        Ok(Self { postgres })
    }
}

/// Whether `name` can be used as an unescaped schema identifier.
pub fn is_valid_schema(name: &str) -> bool {
    SCHEMA_NAME.is_match(name)
}

/// Run `CREATE SCHEMA IF NOT EXISTS` for `schema`.
pub async fn ensure_schema<'c, E>(executor: E, schema: &str) -> Result<(), BootstrapError>
where
    E: Executor<'c, Database = Postgres>,
{
    if !is_valid_schema(schema) {
        return Err(BootstrapError::InvalidSchema(schema.to_owned()));
    }

    let sql = format!(r#"CREATE SCHEMA IF NOT EXISTS "{schema}""#);
    sqlx::query(&sql).execute(executor).await?;

    tracing::debug!(%schema, "schema ensured");
    Ok(())
}

impl FromRef<AppState> for Database {
    fn from_ref(app_state: &AppState) -> Database {
        app_state.db.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_names() {
        assert!(is_valid_schema("public"));
        assert!(is_valid_schema("user_schema_2"));
        assert!(is_valid_schema("_private"));
        assert!(!is_valid_schema(""));
        assert!(!is_valid_schema("2fast"));
        assert!(!is_valid_schema(r#"evil"; DROP TABLE "user"; --"#));
        assert!(!is_valid_schema(&"a".repeat(64)));
    }

    #[sqlx::test]
    async fn test_ensure_schema_is_idempotent(pool: PgPool) {
        ensure_schema(&pool, "people").await.unwrap();
        ensure_schema(&pool, "people").await.unwrap();

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM pg_namespace WHERE nspname = $1)",
        )
        .bind("people")
        .fetch_one(&pool)
        .await
        .unwrap();
        assert!(exists);
    }

    #[sqlx::test]
    async fn test_ensure_schema_rejects_invalid_name(pool: PgPool) {
        let err = ensure_schema(&pool, "bad-name").await.unwrap_err();
        assert!(matches!(err, BootstrapError::InvalidSchema(name) if name == "bad-name"));
    }
}
