use actix_web::{web, App, HttpServer};
use env_logger::Env;
use food_wastage::config::AppConfig;
use food_wastage::import::{import_all, FileOutcome, ImportSources};
use food_wastage::job_controller::state::{start_job_updater, JobsState};
use food_wastage::maintenance::{log_quality_report, quality_report};
use food_wastage::services;
use food_wastage::storage::Storage;
use log::{error, info, warn};
use std::io;

fn log_outcome(outcome: &FileOutcome) {
    match &outcome.result {
        Ok(report) => {
            info!(
                "{}: {} accepted, {} skipped, {} rejected",
                outcome.entity,
                report.accepted_count,
                report.skipped_count,
                report.rejected_count()
            );
            for rejected in &report.rejected_rows {
                warn!("  row {}: {}", rejected.row_number, rejected.reason);
            }
        }
        Err(e) => error!("{}: {}", outcome.entity, e),
    }
}

/// Schema setup and the optional startup import.
fn prepare_storage(config: &AppConfig) -> io::Result<()> {
    let mut storage = Storage::open_initialized(&config.database_path)
        .map_err(|e| io::Error::other(format!("schema setup failed: {e}")))?;
    info!("database ready at {}", config.database_path.display());

    if config.import_on_start {
        let sources = ImportSources::from_dir(&config.data_dir);
        let outcomes = import_all(&mut storage, &sources, config.import_mode)
            .map_err(|e| io::Error::other(format!("import aborted: {e}")))?;
        outcomes.iter().for_each(log_outcome);

        let today = chrono::Local::now().date_naive();
        match quality_report(&storage, today) {
            Ok(report) => log_quality_report(&report),
            Err(e) => warn!("quality check failed: {e}"),
        }
    }
    Ok(())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(io::Error::other)?;
    prepare_storage(&config)?;

    // Initialize job controller state
    let (jobs_state, rx) = JobsState::new();

    // Start job updater task
    let updater_state = jobs_state.clone();
    tokio::spawn(async move {
        start_job_updater(updater_state, rx).await;
    });

    let bind = (config.host.clone(), config.port);
    info!("Server running at http://{}:{}", bind.0, bind.1);

    let config = web::Data::new(config);
    let jobs_state = web::Data::new(jobs_state);
    HttpServer::new(move || {
        App::new()
            .app_data(config.clone())
            .app_data(jobs_state.clone())
            .configure(services::configure)
    })
    .bind(bind)?
    .run()
    .await
}
