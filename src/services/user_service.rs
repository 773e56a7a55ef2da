use sqlx::PgPool;

use crate::error::{Error, Result};
use crate::models::user::User;
use crate::utils::crypto::{hash_password, verify_password};

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

/// Emails are stored and compared trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_user(&self, email: &str, password: &str, company_name: &str) -> Result<User> {
        let email = normalize_email(email);
        let password_hash = hash_password(password)
            .map_err(|e| Error::Internal(format!("Failed to hash password: {}", e)))?;

        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, company_name)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, company_name, created_at
            "#,
        )
        .bind(&email)
        .bind(&password_hash)
        .bind(company_name.trim())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "account created");
                Ok(user)
            }
            Err(err) => match Error::from(err) {
                Error::Conflict(_) => Err(Error::Conflict("Email already exists".to_string())),
                other => Err(other),
            },
        }
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn verify_user(&self, email: &str, password: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, company_name, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;

        match user {
            Some(user) if verify_password(password, &user.password_hash).unwrap_or(false) => Ok(user),
            _ => {
                tracing::debug!("login rejected");
                Err(Error::invalid_credentials())
            }
        }
    }
}
