use chrono::{DateTime, NaiveDate, Utc};
use library_platform_shared::{AdminChangeUserForm, UserResponse, ERROR_EMAIL_ALREADY_EXISTS};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use std::fmt;
use uuid::Uuid;

use crate::error::AppError;

/// Prefix marking a password that can never match, as stored for accounts
/// created without one.
pub const UNUSABLE_PASSWORD_PREFIX: char = '!';

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_photo: Option<String>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub is_email_verified: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fully resolved column values for a new account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub profile_photo: Option<String>,
    pub phone_number: Option<String>,
    pub bio: Option<String>,
    pub is_email_verified: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
}

impl User {
    /// Insert a new user. The email must already be normalized and the
    /// password already hashed.
    pub async fn create(pool: &SqlitePool, new_user: NewUser) -> Result<Self, AppError> {
        let now = Utc::now();

        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                id, email, username, password, first_name, last_name, date_of_birth,
                profile_photo, phone_number, bio, is_email_verified, is_staff,
                is_superuser, is_active, last_login, date_joined, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, NULL, $15, $15, $15)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_user.email)
        .bind(&new_user.username)
        .bind(&new_user.password)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(new_user.date_of_birth)
        .bind(&new_user.profile_photo)
        .bind(&new_user.phone_number)
        .bind(&new_user.bio)
        .bind(new_user.is_email_verified)
        .bind(new_user.is_staff)
        .bind(new_user.is_superuser)
        .bind(new_user.is_active)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::unique_violation(e, ERROR_EMAIL_ALREADY_EXISTS))
    }

    /// Find user by ID
    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Find user by email. Lookups are exact; callers normalize first.
    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    pub async fn email_exists(pool: &SqlitePool, email: &str) -> Result<bool, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(pool)
            .await?;

        Ok(count > 0)
    }

    pub async fn update_last_login(pool: &SqlitePool, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_login = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn update_password(
        pool: &SqlitePool,
        user_id: Uuid,
        new_password_hash: String,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET password = $1, updated_at = $2 WHERE id = $3")
            .bind(new_password_hash)
            .bind(Utc::now())
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn verify_email(pool: &SqlitePool, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET is_email_verified = 1, updated_at = $1 WHERE id = $2")
            .bind(Utc::now())
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Save the editable fields of the admin change form. The email must
    /// already be normalized.
    pub async fn update_from_admin(
        pool: &SqlitePool,
        user_id: Uuid,
        form: &AdminChangeUserForm,
    ) -> Result<Self, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                email = $2,
                username = $3,
                first_name = $4,
                last_name = $5,
                date_of_birth = $6,
                profile_photo = $7,
                is_active = $8,
                is_staff = $9,
                is_superuser = $10,
                updated_at = $11
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&form.email)
        .bind(&form.username)
        .bind(&form.first_name)
        .bind(&form.last_name)
        .bind(form.date_of_birth)
        .bind(&form.profile_photo)
        .bind(form.is_active)
        .bind(form.is_staff)
        .bind(form.is_superuser)
        .bind(Utc::now())
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::unique_violation(e, ERROR_EMAIL_ALREADY_EXISTS))?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    /// Delete a user; their borrowings, reservations, reviews and wishlist
    /// entries go with them.
    pub async fn delete(pool: &SqlitePool, user_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// First and last name separated by a space.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn short_name(&self) -> &str {
        &self.first_name
    }

    /// Username when one is set, otherwise the email.
    pub fn handle(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.email)
    }

    pub fn has_usable_password(&self) -> bool {
        !self.password.starts_with(UNUSABLE_PASSWORD_PREFIX)
    }

    /// Convert to response DTO (without sensitive data)
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            date_of_birth: self.date_of_birth,
            profile_photo: self.profile_photo.clone(),
            phone_number: self.phone_number.clone(),
            bio: self.bio.clone(),
            is_email_verified: self.is_email_verified,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
            is_active: self.is_active,
            last_login: self.last_login,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.email)
    }
}
