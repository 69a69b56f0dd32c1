use chrono::Utc;
use library_platform_shared::{
    UserFields, ERROR_ACCOUNT_DISABLED, ERROR_EMAIL_REQUIRED, ERROR_INVALID_CREDENTIALS,
    ERROR_SUPERUSER_STAFF, ERROR_SUPERUSER_SUPERUSER,
};
use sqlx::SqlitePool;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{NewUser, User};
use crate::utils::crypto::{hash_password, make_unusable_password, verify_password, DEFAULT_PASSWORD_COST};
use crate::utils::validation::{normalize_email, validate_email};

const ERROR_SUPERUSER_ACTIVE: &str = "Superuser must have is_active=True.";

/// Creates and authenticates email-keyed accounts.
#[derive(Clone)]
pub struct UserManager {
    pool: SqlitePool,
    password_cost: u32,
    // Verified against when no account matches the email.
    dummy_hash: Arc<OnceLock<String>>,
}

impl UserManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_password_cost(pool, DEFAULT_PASSWORD_COST)
    }

    pub fn with_password_cost(pool: SqlitePool, password_cost: u32) -> Self {
        Self {
            pool,
            password_cost,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    fn dummy_hash(&self) -> Result<&str, AppError> {
        if let Some(hash) = self.dummy_hash.get() {
            return Ok(hash);
        }
        let hash = hash_password("dummy-password", self.password_cost)?;
        Ok(self.dummy_hash.get_or_init(|| hash))
    }

    /// Create and save a regular user.
    ///
    /// A missing password stores an unusable one. Permission flags default to
    /// staff=false, superuser=false, active=true; a superuser additionally
    /// defaults to staff and active, and may not be created with either
    /// explicitly turned off.
    pub async fn create_user(
        &self,
        email: &str,
        password: Option<&str>,
        fields: UserFields,
    ) -> Result<User, AppError> {
        if email.is_empty() {
            return Err(AppError::Validation(ERROR_EMAIL_REQUIRED.to_string()));
        }

        let email = normalize_email(email);
        validate_email(&email).map_err(|e| AppError::Validation(format!("email: {}", e.code)))?;
        fields.validate()?;

        let is_superuser = fields.is_superuser.unwrap_or(false);
        let is_staff = fields.is_staff.unwrap_or(is_superuser);
        let is_active = fields.is_active.unwrap_or(true);
        if is_superuser {
            check_superuser_flags(is_staff, is_superuser, is_active)?;
        }

        let password = match password {
            Some(raw) => hash_password(raw, self.password_cost)?,
            None => make_unusable_password(),
        };

        let user = User::create(
            &self.pool,
            NewUser {
                email,
                password,
                username: fields.username,
                first_name: fields.first_name,
                last_name: fields.last_name,
                date_of_birth: fields.date_of_birth,
                profile_photo: fields.profile_photo,
                phone_number: fields.phone_number,
                bio: fields.bio,
                is_email_verified: fields.is_email_verified,
                is_staff,
                is_superuser,
                is_active,
            },
        )
        .await?;

        info!(user_id = %user.id, email = %user.email, is_staff, is_superuser, "Created user");
        Ok(user)
    }

    /// Create and save a superuser. Staff, superuser and active default to
    /// true; passing any of them as false is an error.
    pub async fn create_superuser(
        &self,
        email: &str,
        password: Option<&str>,
        mut fields: UserFields,
    ) -> Result<User, AppError> {
        let is_staff = *fields.is_staff.get_or_insert(true);
        let is_superuser = *fields.is_superuser.get_or_insert(true);
        let is_active = *fields.is_active.get_or_insert(true);

        check_superuser_flags(is_staff, is_superuser, is_active)?;

        self.create_user(email, password, fields).await
    }

    /// Check credentials for an active account and stamp its last login.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = normalize_email(email);

        let Some(mut user) = User::find_by_email(&self.pool, &email).await? else {
            verify_password(password, self.dummy_hash()?)?;
            warn!(email = %email, "Rejected login for unknown email");
            return Err(AppError::Authentication(ERROR_INVALID_CREDENTIALS.to_string()));
        };

        if !verify_password(password, &user.password)? {
            warn!(email = %email, "Rejected login with invalid password");
            return Err(AppError::Authentication(ERROR_INVALID_CREDENTIALS.to_string()));
        }

        if !user.is_active {
            warn!(email = %email, "Rejected login for inactive account");
            return Err(AppError::Authentication(ERROR_ACCOUNT_DISABLED.to_string()));
        }

        User::update_last_login(&self.pool, user.id).await?;
        user.last_login = Some(Utc::now());

        Ok(user)
    }

    /// Replace a user's password; `None` makes it unusable.
    pub async fn set_password(&self, user_id: Uuid, password: Option<&str>) -> Result<(), AppError> {
        let password = match password {
            Some(raw) => hash_password(raw, self.password_cost)?,
            None => make_unusable_password(),
        };

        User::update_password(&self.pool, user_id, password).await
    }
}

fn check_superuser_flags(is_staff: bool, is_superuser: bool, is_active: bool) -> Result<(), AppError> {
    if !is_staff {
        return Err(AppError::Validation(ERROR_SUPERUSER_STAFF.to_string()));
    }
    if !is_superuser {
        return Err(AppError::Validation(ERROR_SUPERUSER_SUPERUSER.to_string()));
    }
    if !is_active {
        return Err(AppError::Validation(ERROR_SUPERUSER_ACTIVE.to_string()));
    }
    Ok(())
}
