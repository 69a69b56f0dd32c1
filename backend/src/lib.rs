//! Library platform backend: the user and library data models, the user
//! manager, and the JSON admin served over actix-web.

pub mod admin;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use actix_web::web;

/// Register every route. Callers provide `Database`, `UserManager` and
/// `UserAdmin` as app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/v1").service(handlers::health::health_check))
        .service(
            web::scope("/admin")
                // Fixed paths first so they are not taken for a user id.
                .service(handlers::admin_users::get_user_admin_config)
                .service(handlers::admin_users::get_add_user_form)
                .service(handlers::admin_users::list_users)
                .service(handlers::admin_users::add_user)
                .service(handlers::admin_users::get_user)
                .service(handlers::admin_users::change_user)
                .service(handlers::admin_users::delete_user),
        );
}
