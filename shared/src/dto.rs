use crate::constants::*;
use crate::types::*;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

// User DTOs

/// Optional profile and permission fields accepted by the user manager.
///
/// Permission flags are `None` when the caller did not set them, so the
/// manager can tell an explicit `false` apart from "use the default".
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UserFields {
    #[validate(length(max = 150))]
    pub username: Option<String>,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,

    pub date_of_birth: Option<NaiveDate>,

    pub profile_photo: Option<String>,

    #[validate(length(max = 15), custom = "validate_phone_number")]
    pub phone_number: Option<String>,

    #[validate(length(max = 500))]
    pub bio: Option<String>,

    #[serde(default)]
    pub is_email_verified: bool,

    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
    pub is_active: Option<bool>,
}

/// Payload of the admin "add user" form.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdminAddUserForm {
    #[validate(email, length(max = 254))]
    pub email: String,

    #[validate(length(max = 150))]
    pub username: Option<String>,

    #[validate(length(min = 1))]
    pub password1: String,

    #[validate(must_match = "password1")]
    pub password2: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,

    pub date_of_birth: Option<NaiveDate>,
    pub profile_photo: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

impl AdminAddUserForm {
    pub fn into_fields(self) -> (String, String, UserFields) {
        let fields = UserFields {
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: self.date_of_birth,
            profile_photo: self.profile_photo,
            is_staff: Some(self.is_staff),
            is_superuser: Some(self.is_superuser),
            is_active: Some(self.is_active),
            ..UserFields::default()
        };
        (self.email, self.password1, fields)
    }
}

/// Payload of the admin "change user" form. Read-only fields are not accepted.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdminChangeUserForm {
    #[validate(email, length(max = 254))]
    pub email: String,

    #[validate(length(max = 150))]
    pub username: Option<String>,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,

    pub date_of_birth: Option<NaiveDate>,
    pub profile_photo: Option<String>,

    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
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
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Library DTOs

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAuthorRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    pub bio: Option<String>,

    pub birth_date: Option<NaiveDate>,

    #[serde(default)]
    #[validate(length(max = 100))]
    pub nationality: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePublisherRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    #[validate(length(max = 20))]
    pub phone: String,

    #[validate(url)]
    pub website: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBookRequest {
    #[validate(length(min = 1, max = 300))]
    pub title: String,

    #[validate(length(min = 1, max = 13), custom = "validate_isbn")]
    pub isbn: String,

    #[serde(default)]
    pub description: String,

    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub publisher_id: Option<Uuid>,

    pub publication_date: NaiveDate,

    #[validate(range(min = 1))]
    pub pages: i32,

    #[serde(default = "default_language")]
    #[validate(length(min = 1, max = 50))]
    pub language: String,

    #[serde(default)]
    pub status: BookStatus,

    #[serde(default = "default_copies")]
    #[validate(range(min = 0))]
    pub quantity: i32,

    #[serde(default = "default_copies")]
    #[validate(range(min = 0))]
    pub available_copies: i32,

    #[serde(default)]
    #[validate(custom = "validate_book_rating")]
    pub rating: Decimal,

    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBorrowingRequest {
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub due_date: NaiveDate,

    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReservationRequest {
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub expiry_date: NaiveDate,

    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReviewRequest {
    pub book_id: Uuid,
    pub user_id: Uuid,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1))]
    pub content: String,

    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
}

// Field validators

fn default_true() -> bool {
    true
}

fn default_copies() -> i32 {
    1
}

fn default_language() -> String {
    DEFAULT_BOOK_LANGUAGE.to_string()
}

/// Book ratings are decimals in [0, 5] with at most two decimal places.
pub fn validate_book_rating(rating: &Decimal) -> Result<(), ValidationError> {
    if *rating < Decimal::from(MIN_BOOK_RATING) || *rating > Decimal::from(MAX_BOOK_RATING) {
        return Err(ValidationError::new("rating_out_of_range"));
    }
    if rating.normalize().scale() > 2 {
        return Err(ValidationError::new("rating_too_precise"));
    }
    Ok(())
}

/// ISBN-10 (last character may be `X`) or ISBN-13, digits only.
pub fn validate_isbn(isbn: &str) -> Result<(), ValidationError> {
    let valid = match isbn.len() {
        10 => {
            let (body, check) = isbn.split_at(9);
            body.chars().all(|c| c.is_ascii_digit())
                && check.chars().all(|c| c.is_ascii_digit() || c == 'X' || c == 'x')
        }
        13 => isbn.chars().all(|c| c.is_ascii_digit()),
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_isbn"))
    }
}

pub fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    if digits.len() < 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::new("invalid_phone_format"));
    }
    Ok(())
}
