//! Read-only report endpoints for dashboards.
//!
//! - `GET /api/reports/listings?location=&provider=&food_type=`: listings with
//!   their provider, soonest expiry first. Each parameter takes a comma
//!   separated list.
//! - `GET /api/reports/contacts`: provider and receiver directories, plus the
//!   receivers that have claimed food.
//! - `GET /api/reports/insights`: slugs and titles of the available insights.
//! - `GET /api/reports/insights/{slug}`: one insight as a table.

use crate::config::AppConfig;
use crate::error::ReportError;
use crate::reports::{browse_listings, contact_directory, run_insight, Insight};
use crate::services::today;
use crate::storage::Storage;
use actix_web::web::{get, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use common::requests::ListingQuery;
use serde_json::json;

const API_PATH: &str = "/api/reports";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/listings", get().to(listings))
        .route("/contacts", get().to(contacts))
        .route("/insights", get().to(catalogue))
        .route("/insights/{slug}", get().to(insight))
}

async fn listings(query: web::Query<ListingQuery>, config: web::Data<AppConfig>) -> impl Responder {
    let filter = query.into_inner().into_filter();
    let result = Storage::open(&config.database_path)
        .map_err(|e| e.to_string())
        .and_then(|storage| browse_listings(&storage, &filter).map_err(|e| e.to_string()));
    match result {
        Ok(rows) => HttpResponse::Ok().json(rows),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Error retrieving listings: {}", e)),
    }
}

async fn contacts(config: web::Data<AppConfig>) -> impl Responder {
    let result = Storage::open(&config.database_path)
        .map_err(|e| e.to_string())
        .and_then(|storage| contact_directory(&storage).map_err(|e| e.to_string()));
    match result {
        Ok(directory) => HttpResponse::Ok().json(directory),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Error retrieving contacts: {}", e)),
    }
}

async fn catalogue() -> impl Responder {
    let entries: Vec<_> = Insight::ALL
        .iter()
        .map(|i| json!({ "slug": i.slug(), "title": i.title() }))
        .collect();
    HttpResponse::Ok().json(entries)
}

async fn insight(slug: web::Path<String>, config: web::Data<AppConfig>) -> impl Responder {
    let insight = match slug.parse::<Insight>() {
        Ok(insight) => insight,
        Err(e) => return HttpResponse::NotFound().body(e.to_string()),
    };
    let storage = match Storage::open(&config.database_path) {
        Ok(storage) => storage,
        Err(e) => return HttpResponse::ServiceUnavailable().body(e.to_string()),
    };
    match run_insight(&storage, insight, today(), config.near_expiry_days) {
        Ok(table) => HttpResponse::Ok().json(table),
        Err(ReportError::UnknownInsight(name)) => HttpResponse::NotFound().body(name),
        Err(e) => HttpResponse::ServiceUnavailable().body(format!("Error running insight: {}", e)),
    }
}
