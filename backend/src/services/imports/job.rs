//! Background execution of imports.
//!
//! The handler registers the job as `Pending` and returns its id right away. A
//! Tokio task then runs the synchronous import on the blocking pool and
//! reports progress and the final outcome through `JobsState`.

use crate::import::{
    import_all_with_progress, import_file_with_progress, FileSummary, ImportMode, ImportSources,
};
use crate::job_controller::state::{JobUpdate, JobsState};
use crate::storage::Storage;
use common::jobs::JobStatus;
use common::model::EntityKind;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub(crate) enum ImportWork {
    /// One uploaded file for one table.
    File { entity: EntityKind, path: PathBuf },
    /// The four conventional files of a data directory.
    Directory { dir: PathBuf, mode: ImportMode },
}

pub(crate) async fn schedule_import(
    state: &JobsState,
    database_path: PathBuf,
    work: ImportWork,
) -> String {
    let job_id = uuid::Uuid::new_v4().to_string();
    state
        .jobs
        .write()
        .await
        .insert(job_id.clone(), JobStatus::Pending);

    let state = state.clone();
    let value = job_id.clone();
    tokio::spawn(async move {
        let tx_block = state.tx.clone();
        let job_for_blocking = value.clone();
        let writer = state.writer.clone();

        let handle = tokio::task::spawn_blocking(move || {
            // A poisoned lock only means an earlier job panicked; the
            // database itself is protected by its own transactions.
            let _guard = writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            run_import_blocking(&tx_block, &job_for_blocking, &database_path, work)
        });

        let status = match handle.await {
            Ok(Ok(summary)) => JobStatus::Completed(summary),
            Ok(Err(e)) => JobStatus::Failed(e),
            Err(join_err) => JobStatus::Failed(format!("join error: {join_err}")),
        };
        state.jobs.write().await.insert(value, status);
    });

    job_id
}

/// Runs the import and returns the JSON encoded summaries.
fn run_import_blocking(
    tx: &mpsc::Sender<JobUpdate>,
    job_id: &str,
    database_path: &Path,
    work: ImportWork,
) -> Result<String, String> {
    let _ = tx.blocking_send(JobUpdate {
        job_id: job_id.to_string(),
        status: JobStatus::InProgress(0),
    });
    let mut report_progress = |rows: usize| {
        let _ = tx.blocking_send(JobUpdate {
            job_id: job_id.to_string(),
            status: JobStatus::InProgress(u32::try_from(rows).unwrap_or(u32::MAX)),
        });
    };

    let mut storage = Storage::open_initialized(database_path).map_err(|e| e.to_string())?;

    let summaries: Vec<FileSummary> = match work {
        ImportWork::File { entity, path } => {
            let report =
                import_file_with_progress(&mut storage, entity, &path, &mut report_progress)
                    .map_err(|e| e.to_string())?;
            vec![FileSummary {
                entity,
                source: path,
                report: Some(report),
                error: None,
            }]
        }
        ImportWork::Directory { dir, mode } => {
            let sources = ImportSources::from_dir(&dir);
            let outcomes = import_all_with_progress(&mut storage, &sources, mode, &mut |_, rows| {
                report_progress(rows)
            })
            .map_err(|e| e.to_string())?;
            outcomes.iter().map(FileSummary::from).collect()
        }
    };

    log::info!("import job {job_id} finished");
    serde_json::to_string(&summaries).map_err(|e| e.to_string())
}
