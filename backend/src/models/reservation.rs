use chrono::{DateTime, NaiveDate, Utc};
use library_platform_shared::CreateReservationRequest;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{Book, User};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub reservation_date: DateTime<Utc>,
    pub expiry_date: NaiveDate,
    pub is_active: bool,
    pub notes: String,
}

impl Reservation {
    pub async fn create(
        pool: &SqlitePool,
        request: CreateReservationRequest,
    ) -> Result<Self, AppError> {
        request.validate()?;

        sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (id, book_id, user_id, reservation_date, expiry_date, is_active, notes)
            VALUES ($1, $2, $3, $4, $5, 1, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.book_id)
        .bind(request.user_id)
        .bind(Utc::now())
        .bind(request.expiry_date)
        .bind(&request.notes)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::from_constraint(e, "Reservation already exists.", "Book or user does not exist."))
    }

    pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<Self>, AppError> {
        let reservation = sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(reservation)
    }

    pub async fn find_by_user(pool: &SqlitePool, user_id: Uuid) -> Result<Vec<Self>, AppError> {
        let reservations = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE user_id = $1 ORDER BY reservation_date DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(reservations)
    }

    /// Active reservations on a book, most recent first.
    pub async fn find_active_for_book(
        pool: &SqlitePool,
        book_id: Uuid,
    ) -> Result<Vec<Self>, AppError> {
        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT * FROM reservations
            WHERE book_id = $1 AND is_active = 1
            ORDER BY reservation_date DESC
            "#,
        )
        .bind(book_id)
        .fetch_all(pool)
        .await?;

        Ok(reservations)
    }

    /// Active reservations whose expiry date is before `today`.
    pub async fn find_expired(pool: &SqlitePool, today: NaiveDate) -> Result<Vec<Self>, AppError> {
        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT * FROM reservations
            WHERE is_active = 1 AND expiry_date < $1
            ORDER BY reservation_date DESC
            "#,
        )
        .bind(today)
        .fetch_all(pool)
        .await?;

        Ok(reservations)
    }

    pub async fn deactivate(pool: &SqlitePool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE reservations SET is_active = 0 WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Reservation {} not found", id)));
        }
        Ok(())
    }

    pub async fn delete(pool: &SqlitePool, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_on(Utc::now().date_naive())
    }

    /// Inactive reservations are never expired.
    pub fn is_expired_on(&self, today: NaiveDate) -> bool {
        self.is_active && today > self.expiry_date
    }

    pub fn describe(&self, user: &User, book: &Book) -> String {
        format!("{} reserved {}", user.handle(), book.title)
    }
}
