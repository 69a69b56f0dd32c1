use actix_web::{web, HttpResponse, Result};
use library_platform_shared::{AdminAddUserForm, AdminChangeUserForm};
use tracing::{debug, info};
use uuid::Uuid;

use crate::admin::{UserAdmin, UserListQuery};
use crate::error::AppError;
use crate::middleware::auth::StaffUser;

/// Column, filter and fieldset metadata of the user admin
#[actix_web::get("/users/config")]
pub async fn get_user_admin_config(
    _staff: StaffUser,
    admin: web::Data<UserAdmin>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(admin.options()))
}

/// Empty add-user form
#[actix_web::get("/users/add")]
pub async fn get_add_user_form(
    staff: StaffUser,
    admin: web::Data<UserAdmin>,
) -> Result<HttpResponse, AppError> {
    staff.require_superuser()?;
    Ok(HttpResponse::Ok().json(admin.add_form()))
}

/// Searchable, filterable, paginated user change list
#[actix_web::get("/users")]
pub async fn list_users(
    staff: StaffUser,
    query: web::Query<UserListQuery>,
    admin: web::Data<UserAdmin>,
) -> Result<HttpResponse, AppError> {
    debug!("User change list requested by {}", staff.user().email);

    let changelist = admin.changelist(&query).await?;
    Ok(HttpResponse::Ok().json(changelist))
}

/// Change form of one user
#[actix_web::get("/users/{user_id}")]
pub async fn get_user(
    _staff: StaffUser,
    path: web::Path<Uuid>,
    admin: web::Data<UserAdmin>,
) -> Result<HttpResponse, AppError> {
    let form = admin.change_form(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(form))
}

#[actix_web::post("/users")]
pub async fn add_user(
    staff: StaffUser,
    form: web::Json<AdminAddUserForm>,
    admin: web::Data<UserAdmin>,
) -> Result<HttpResponse, AppError> {
    staff.require_superuser()?;

    info!("Admin {} adding user {}", staff.user().email, form.email);

    let user = admin.add_user(form.into_inner()).await?;
    Ok(HttpResponse::Created().json(user.to_response()))
}

#[actix_web::put("/users/{user_id}")]
pub async fn change_user(
    staff: StaffUser,
    path: web::Path<Uuid>,
    form: web::Json<AdminChangeUserForm>,
    admin: web::Data<UserAdmin>,
) -> Result<HttpResponse, AppError> {
    staff.require_superuser()?;

    let user = admin.change_user(path.into_inner(), form.into_inner()).await?;
    Ok(HttpResponse::Ok().json(user.to_response()))
}

#[actix_web::delete("/users/{user_id}")]
pub async fn delete_user(
    staff: StaffUser,
    path: web::Path<Uuid>,
    admin: web::Data<UserAdmin>,
) -> Result<HttpResponse, AppError> {
    staff.require_superuser()?;

    let user_id = path.into_inner();
    if user_id == staff.user().id {
        return Err(AppError::Validation(
            "You cannot delete the account you are signed in with".to_string(),
        ));
    }

    admin.delete_user(user_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
