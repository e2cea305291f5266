use super::job::{schedule_import, ImportWork};
use crate::config::AppConfig;
use crate::job_controller::state::JobsState;
use actix_web::{web, HttpResponse, Responder};

/// Starts a full import of the configured data directory.
pub(crate) async fn process(
    state: web::Data<JobsState>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    let work = ImportWork::Directory {
        dir: config.data_dir.clone(),
        mode: config.import_mode,
    };
    let job_id = schedule_import(&state, config.database_path.clone(), work).await;
    HttpResponse::Ok().body(job_id)
}
