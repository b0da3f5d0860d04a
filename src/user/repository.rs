//! Handle database requests.

use sqlx::{PgConnection, Pool, Postgres};

use crate::error::Result;
use crate::user::{Address, NewAddress, NewUser, User, UserPatch};

#[derive(Clone)]
pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    /// Create a new [`UserRepository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert [`User`] and its addresses in a single transaction.
    pub async fn insert(&self, user: NewUser) -> Result<User> {
        let mut tx = self.pool.begin().await?;

        let id: i32 = sqlx::query_scalar(
            r#"INSERT INTO "user" (name, lastname, cpf, birth_date)
                VALUES ($1, $2, $3, $4)
                RETURNING id"#,
        )
        .bind(&user.name)
        .bind(&user.lastname)
        .bind(&user.cpf)
        .bind(user.birth_date)
        .fetch_one(&mut *tx)
        .await?;

        let addresses = insert_addresses(&mut tx, id, user.addresses).await?;

        tx.commit().await?;

        Ok(User {
            id,
            name: user.name,
            lastname: user.lastname,
            cpf: user.cpf,
            birth_date: user.birth_date,
            addresses,
        })
    }

    /// Find every user named exactly `name`.
    pub async fn find_by_name(&self, name: &str) -> Result<Vec<User>> {
        let query = get_by_field_query(Field::Name);

        Ok(sqlx::query_as::<_, User>(&query)
            .bind(name)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Find user using `cpf` field.
    pub async fn find_by_cpf(&self, cpf: &str) -> Result<Option<User>> {
        let query = get_by_field_query(Field::Cpf);

        Ok(sqlx::query_as::<_, User>(&query)
            .bind(cpf)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Find user using `id` field.
    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>> {
        let query = get_by_field_query(Field::Id);

        Ok(sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Merge `patch` into user `id` in a single transaction.
    ///
    /// Absent fields keep the stored value through `COALESCE`, so concurrent
    /// patches on distinct fields never overwrite each other. When
    /// `patch.addresses` is given, stored addresses are dropped and replaced.
    ///
    /// Returns `None` when no row matches `id`.
    pub async fn update(&self, id: i32, patch: UserPatch) -> Result<Option<User>> {
        let mut tx = self.pool.begin().await?;

        let updated: Option<i32> = sqlx::query_scalar(
            r#"UPDATE "user"
                SET name = COALESCE($1, name),
                    lastname = COALESCE($2, lastname),
                    cpf = COALESCE($3, cpf),
                    birth_date = COALESCE($4, birth_date)
                WHERE id = $5
                RETURNING id"#,
        )
        .bind(patch.name)
        .bind(patch.lastname)
        .bind(patch.cpf)
        .bind(patch.birth_date)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if updated.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        if let Some(addresses) = patch.addresses {
            sqlx::query(r#"DELETE FROM address WHERE user_id = $1"#)
                .bind(id)
                .execute(&mut *tx)
                .await?;

            insert_addresses(&mut tx, id, addresses).await?;
        }

        // Read back under the row lock.
        let user = sqlx::query_as::<_, User>(&get_by_field_query(Field::Id))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(user))
    }

    /// Delete user, its addresses follow through `ON DELETE CASCADE`.
    ///
    /// Returns `false` when no row matches `id`.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let result = sqlx::query(r#"DELETE FROM "user" WHERE id = $1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

async fn insert_addresses(
    conn: &mut PgConnection,
    user_id: i32,
    addresses: Vec<NewAddress>,
) -> Result<Vec<Address>> {
    let mut saved = Vec::with_capacity(addresses.len());

    for address in addresses {
        let id: i32 = sqlx::query_scalar(
            r#"INSERT INTO address (street, additional, city, state, zip, user_id)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id"#,
        )
        .bind(&address.street)
        .bind(&address.additional)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.zip)
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

        saved.push(address.persisted(id, user_id));
    }

    Ok(saved)
}

enum Field {
    Id,
    Name,
    Cpf,
}

impl Field {
    fn column(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Name => "name",
            Field::Cpf => "cpf",
        }
    }
}

fn get_by_field_query(field: Field) -> String {
    let column = field.column();
    format!(
        r#"SELECT
                u.id,
                u.name,
                u.lastname,
                u.cpf,
                u.birth_date,
                COALESCE(
                    JSONB_AGG(
                        JSONB_BUILD_OBJECT(
                            'id', a.id,
                            'street', a.street,
                            'additional', a.additional,
                            'city', a.city,
                            'state', a.state,
                            'zip', a.zip,
                            'userId', a.user_id
                        ) ORDER BY a.id
                    ) FILTER (WHERE a.id IS NOT NULL),
                    '[]'
                ) AS addresses
            FROM "user" u
            LEFT JOIN address a ON a.user_id = u.id
            WHERE u.{column} = $1
            GROUP BY u.id
            ORDER BY u.id;
            "#
    )
}
