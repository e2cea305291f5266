//! Housekeeping endpoints.
//!
//! - `GET /api/maintenance/quality`: row counts and data quality indicators.
//! - `POST /api/maintenance/purge-expired`: deletes listings past their expiry
//!   date along with their claims. Waits for any running import to finish.

use crate::config::AppConfig;
use crate::job_controller::state::JobsState;
use crate::maintenance::{purge_expired, quality_report};
use crate::services::today;
use crate::storage::Storage;
use actix_web::web::{get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};

const API_PATH: &str = "/api/maintenance";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/quality", get().to(quality))
        .route("/purge-expired", post().to(purge))
}

async fn quality(config: web::Data<AppConfig>) -> impl Responder {
    let result = Storage::open(&config.database_path)
        .map_err(|e| e.to_string())
        .and_then(|storage| quality_report(&storage, today()).map_err(|e| e.to_string()));
    match result {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Quality check failed: {}", e)),
    }
}

async fn purge(state: web::Data<JobsState>, config: web::Data<AppConfig>) -> impl Responder {
    let writer = state.writer.clone();
    let database_path = config.database_path.clone();
    let result = web::block(move || {
        let _guard = writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut storage = Storage::open_initialized(&database_path).map_err(|e| e.to_string())?;
        purge_expired(&mut storage, today()).map_err(|e| e.to_string())
    })
    .await;

    match result {
        Ok(Ok(summary)) => HttpResponse::Ok().json(summary),
        Ok(Err(e)) => HttpResponse::ServiceUnavailable().body(format!("Purge failed: {}", e)),
        Err(e) => HttpResponse::InternalServerError().body(format!("Purge aborted: {}", e)),
    }
}
