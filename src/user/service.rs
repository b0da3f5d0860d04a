use sqlx::{Pool, Postgres};

use crate::error::{Result, ServerError};
use crate::user::{NewUser, User, UserPatch, UserRepository};

/// User manager.
#[derive(Clone)]
pub struct UserService {
    pub repo: UserRepository,
}

impl UserService {
    /// Create a new [`UserService`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            repo: UserRepository::new(pool),
        }
    }

    /// Persist a user together with its addresses.
    pub async fn create(&self, user: NewUser) -> Result<User> {
        tracing::info!(addresses = user.addresses.len(), "creating a new user");

        let user = self.repo.insert(user).await.inspect_err(|err| {
            tracing::warn!(error = %err, "user not created");
        })?;

        tracing::info!(user_id = user.id, "user created");
        Ok(user)
    }

    /// Every user whose name equals `name`.
    pub async fn find_by_name(&self, name: &str) -> Result<Vec<User>> {
        let users = self.repo.find_by_name(name).await?;

        if users.is_empty() {
            tracing::warn!(%name, "no users found with the given name");
            return Err(ServerError::NotFound("No users found with the given name."));
        }

        tracing::info!(%name, count = users.len(), "users found by name");
        Ok(users)
    }

    /// The user owning `cpf`.
    pub async fn find_by_cpf(&self, cpf: &str) -> Result<User> {
        match self.repo.find_by_cpf(cpf).await? {
            Some(user) => {
                tracing::info!(user_id = user.id, "user found by cpf");
                Ok(user)
            },
            None => {
                tracing::warn!("user not found with the given cpf");
                Err(ServerError::NotFound("User not found with the given CPF."))
            },
        }
    }

    /// Merge `patch` into user `id`.
    ///
    /// Addresses are replaced as a whole when the patch carries them, and
    /// left untouched otherwise.
    pub async fn update(&self, id: i32, patch: UserPatch) -> Result<User> {
        let replaced = patch.addresses.is_some();

        match self.repo.update(id, patch).await? {
            Some(user) => {
                tracing::info!(user_id = id, addresses_replaced = replaced, "user updated");
                Ok(user)
            },
            None => {
                tracing::warn!(user_id = id, "user not found for update");
                Err(ServerError::NotFound("User not found."))
            },
        }
    }

    /// Delete user `id` and, by cascade, its addresses.
    pub async fn remove(&self, id: i32) -> Result<()> {
        if !self.repo.delete(id).await? {
            tracing::warn!(user_id = id, "user not found for removal");
            return Err(ServerError::NotFound("User not found."));
        }

        tracing::info!(user_id = id, "user removed");
        Ok(())
    }
}
