//! HTTP routes and shared extractors.
pub mod status;
pub mod user;

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::ServerError;

/// JSON body checked with [`Validate`] before reaching the handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Valid<T>(pub T);

impl<T, S> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Valid(value))
    }
}

/// Deserialize an optional field whose key, when present, must hold a value.
///
/// Pair with `#[serde(default)]`: a missing key yields `None`, an explicit
/// `null` is an error.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// MUST NEVER be used in production.
#[cfg(test)]
pub fn state(pool: sqlx::PgPool) -> crate::AppState {
    crate::AppState {
        config: std::sync::Arc::new(crate::config::Configuration::default()),
        db: crate::database::Database {
            postgres: pool.clone(),
        },
        users: crate::user::UserService::new(pool),
        metrics: None,
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::present;

    #[derive(Debug, Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "present")]
        name: Option<String>,
    }

    #[test]
    fn test_present_field() {
        let patch: Patch = serde_json::from_str(r#"{"name":"Alex"}"#).unwrap();
        assert_eq!(patch.name.as_deref(), Some("Alex"));

        let patch: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch.name, None);

        assert!(serde_json::from_str::<Patch>(r#"{"name":null}"#).is_err());
    }
}
