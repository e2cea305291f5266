//! HTTP JSON surface over the pipeline. Each sub-module owns one scope.

pub mod imports;
pub mod maintenance;
pub mod reports;

use actix_web::web;
use chrono::NaiveDate;

/// Registers every scope. Expects `web::Data<AppConfig>` and
/// `web::Data<JobsState>` to be present in the application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(imports::configure_routes())
        .service(reports::configure_routes())
        .service(maintenance::configure_routes());
}

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
