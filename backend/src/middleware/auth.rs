use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use base64::{engine::general_purpose::STANDARD, Engine};
use library_platform_shared::{ERROR_INVALID_CREDENTIALS, ERROR_STAFF_REQUIRED};
use std::{future::Future, pin::Pin};
use tracing::warn;

use crate::error::AppError;
use crate::models::User;
use crate::services::UserManager;

const ERROR_CREDENTIALS_REQUIRED: &str = "Authentication credentials were not provided";
const ERROR_SUPERUSER_REQUIRED: &str = "Superuser status required for this action";

/// An active staff account authenticated with HTTP Basic credentials
/// (email and password).
#[derive(Debug, Clone)]
pub struct StaffUser(pub User);

impl StaffUser {
    pub fn user(&self) -> &User {
        &self.0
    }

    /// Mutating admin actions are reserved for superusers.
    pub fn require_superuser(&self) -> Result<(), AppError> {
        if self.0.is_superuser {
            Ok(())
        } else {
            Err(AppError::Authorization(ERROR_SUPERUSER_REQUIRED.to_string()))
        }
    }
}

impl FromRequest for StaffUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let credentials = basic_credentials(req);
        let manager = req.app_data::<web::Data<UserManager>>().cloned();

        Box::pin(async move {
            let manager = manager
                .ok_or_else(|| AppError::Internal("UserManager not configured".to_string()))?;
            let (email, password) = credentials?;

            let user = manager.authenticate(&email, &password).await?;
            if !user.is_staff {
                warn!(user_id = %user.id, "Non-staff account tried to reach the admin");
                return Err(AppError::Authorization(ERROR_STAFF_REQUIRED.to_string()));
            }

            Ok(StaffUser(user))
        })
    }
}

/// Decode `Authorization: Basic base64(email:password)`.
fn basic_credentials(req: &HttpRequest) -> Result<(String, String), AppError> {
    let encoded = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Basic "))
        .ok_or_else(|| AppError::Authentication(ERROR_CREDENTIALS_REQUIRED.to_string()))?;

    let decoded = STANDARD
        .decode(encoded.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .ok_or_else(|| AppError::Authentication(ERROR_INVALID_CREDENTIALS.to_string()))?;

    decoded
        .split_once(':')
        .map(|(email, password)| (email.to_string(), password.to_string()))
        .ok_or_else(|| AppError::Authentication(ERROR_INVALID_CREDENTIALS.to_string()))
}
