use actix_web::{get, web, HttpResponse, Result};
use serde_json::json;
use tracing::error;

use crate::database::Database;

#[get("/health")]
pub async fn health_check(database: web::Data<Database>) -> Result<HttpResponse> {
    let database_status = match database.health_check().await {
        Ok(()) => "ok",
        Err(e) => {
            error!("Database health check failed: {}", e);
            "unavailable"
        }
    };

    let body = json!({
        "status": if database_status == "ok" { "healthy" } else { "degraded" },
        "service": "library-platform-backend",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database_status
    });

    if database_status == "ok" {
        Ok(HttpResponse::Ok().json(body))
    } else {
        Ok(HttpResponse::ServiceUnavailable().json(body))
    }
}
