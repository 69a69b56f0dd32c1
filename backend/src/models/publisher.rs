use chrono::{DateTime, Utc};
use library_platform_shared::CreatePublisherRequest;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Publisher {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Publisher {
    pub async fn create(pool: &SqlitePool, request: CreatePublisherRequest) -> Result<Self, AppError> {
        request.validate()?;

        sqlx::query_as::<_, Publisher>(
            r#"
            INSERT INTO publishers (id, name, address, phone, website, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&request.name)
        .bind(&request.address)
        .bind(&request.phone)
        .bind(&request.website)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::unique_violation(e, "Publisher with this Name already exists."))
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, AppError> {
        let publisher = sqlx::query_as::<_, Publisher>("SELECT * FROM publishers WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(publisher)
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<Self>, AppError> {
        let publishers = sqlx::query_as::<_, Publisher>("SELECT * FROM publishers ORDER BY name ASC")
            .fetch_all(pool)
            .await?;

        Ok(publishers)
    }

    /// Books from this publisher keep existing with no publisher.
    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM publishers WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl fmt::Display for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
