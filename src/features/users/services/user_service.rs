use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::models::User;

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the caller's profile, creating the row on first sight. The
    /// token is the identity source, so there is no separate signup.
    pub async fn get_or_create(&self, auth: &AuthenticatedUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, display_name)
            VALUES ($1, $2)
            ON CONFLICT (username) DO UPDATE
                SET display_name = COALESCE(EXCLUDED.display_name, users.display_name),
                    updated_at = now()
            RETURNING id, username, display_name, counter_id, created_at, updated_at
            "#,
        )
        .bind(&auth.sub)
        .bind(&auth.display_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Record which counter the caller works at; `None` releases it.
    pub async fn assign_counter(
        &self,
        auth: &AuthenticatedUser,
        counter_id: Option<uuid::Uuid>,
    ) -> Result<User> {
        if let Some(id) = counter_id {
            let exists =
                sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM counters WHERE id = $1)")
                    .bind(id)
                    .fetch_one(&self.pool)
                    .await?;
            if !exists {
                return Err(AppError::NotFound("Counter not found".to_string()));
            }
        }

        // Ensure the row exists before updating; first call may arrive here.
        self.get_or_create(auth).await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET counter_id = $2, updated_at = now()
            WHERE username = $1
            RETURNING id, username, display_name, counter_id, created_at, updated_at
            "#,
        )
        .bind(&auth.sub)
        .bind(counter_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}
