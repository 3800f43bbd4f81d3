//! User repository

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::codec::encode_defaulted;
use super::models::UserRow;
use super::CallContext;
use crate::{errors::ShipmanError, models::User};

macro_rules! columns {
    () => {
        "id, email, password_hash, full_name, role, created_at, updated_at"
    };
}

/// CRUD over `shipman.users`
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a user, `role` defaulting to `user`. Fails with
    /// `ConstraintViolation` when the email is taken in any letter case.
    pub async fn create(&self, ctx: &CallContext, user: &mut User) -> Result<(), ShipmanError> {
        let row = ctx
            .run(async {
                sqlx::query_as::<_, UserRow>(concat!(
                    "INSERT INTO shipman.users (email, password_hash, full_name, role)
                    VALUES ($1, $2, $3, COALESCE($4, 'user'))
                    RETURNING ",
                    columns!()
                ))
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(&user.full_name)
                .bind(encode_defaulted(&user.role))
                .fetch_one(&self.pool)
                .await
                .map_err(ShipmanError::from)
            })
            .await?;

        *user = row.into();
        debug!("Created user {}", user.id);
        Ok(())
    }

    pub async fn retrieve(&self, ctx: &CallContext, id: Uuid) -> Result<User, ShipmanError> {
        ctx.run(async {
            let row = sqlx::query_as::<_, UserRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.users WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

            row.map(User::from)
                .ok_or_else(|| ShipmanError::not_found("user", id))
        })
        .await
    }

    /// Look a user up by email, ignoring case
    pub async fn retrieve_by_email(
        &self,
        ctx: &CallContext,
        email: &str,
    ) -> Result<User, ShipmanError> {
        ctx.run(async {
            let row = sqlx::query_as::<_, UserRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.users WHERE lower(email) = lower($1)"
            ))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

            row.map(User::from)
                .ok_or_else(|| ShipmanError::NotFoundByKey {
                    entity: "user",
                    key: format!("email {}", email),
                })
        })
        .await
    }

    /// Newest first
    pub async fn list(
        &self,
        ctx: &CallContext,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, ShipmanError> {
        ctx.run(async {
            let rows = sqlx::query_as::<_, UserRow>(concat!(
                "SELECT ",
                columns!(),
                " FROM shipman.users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
            ))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

            Ok::<_, ShipmanError>(rows.into_iter().map(User::from).collect())
        })
        .await
    }

    pub async fn update(&self, ctx: &CallContext, user: &mut User) -> Result<(), ShipmanError> {
        let id = user.id;
        let updated_at = ctx
            .run(async {
                sqlx::query_scalar::<_, DateTime<Utc>>(
                    "UPDATE shipman.users
                    SET email = $2,
                        password_hash = $3,
                        full_name = $4,
                        role = $5,
                        updated_at = NOW()
                    WHERE id = $1
                    RETURNING updated_at",
                )
                .bind(id)
                .bind(&user.email)
                .bind(&user.password_hash)
                .bind(&user.full_name)
                .bind(&user.role)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| ShipmanError::not_found("user", id))
            })
            .await?;

        user.updated_at = updated_at;
        Ok(())
    }

    pub async fn delete(&self, ctx: &CallContext, id: Uuid) -> Result<u64, ShipmanError> {
        ctx.run(async {
            let result = sqlx::query("DELETE FROM shipman.users WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
            Ok::<_, ShipmanError>(result.rows_affected())
        })
        .await
    }
}
