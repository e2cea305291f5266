use super::job::{schedule_import, ImportWork};
use crate::config::AppConfig;
use crate::job_controller::state::JobsState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use common::model::EntityKind;
use common::requests::ImportUploadRequest;
use actix_web::web::Bytes;
use futures_util::{Stream, StreamExt};
use md5::Context;
use serde_json::from_slice;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// HTTP handler wrapper that converts the internal result to an `HttpResponse`.
///
/// - On success: returns `200 OK` with the job id as body.
/// - On failure: returns `400 Bad Request` with the error message.
pub(crate) async fn process(
    payload: Multipart,
    state: web::Data<JobsState>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    match store_upload(payload, &config.upload_dir).await {
        Ok((entity, path)) => {
            let work = ImportWork::File { entity, path };
            let job_id = schedule_import(&state, config.database_path.clone(), work).await;
            HttpResponse::Ok().body(job_id)
        }
        Err(e) => HttpResponse::BadRequest().body(format!("Error: {}", e)),
    }
}

/// Writes the uploaded CSV to `upload_dir` as `{entity}_{md5}.csv`.
///
/// The `json` part must come before the `file` part so the target entity is
/// known when the bytes arrive. Identical uploads map to the same file name.
async fn store_upload(
    mut payload: Multipart,
    upload_dir: &Path,
) -> Result<(EntityKind, PathBuf), Box<dyn std::error::Error>> {
    let mut entity: Option<EntityKind> = None;
    let mut stored: Option<PathBuf> = None;

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match field_name.as_deref() {
            Some("json") => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    bytes.extend_from_slice(&chunk?);
                }
                let request: ImportUploadRequest = from_slice(&bytes)?;
                entity = Some(request.entity);
            }

            Some("file") => {
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                if !filename.to_ascii_lowercase().ends_with(".csv") {
                    return Err("The file must end with .csv".into());
                }
                let kind = entity.ok_or("The json part must be sent before the file")?;

                let target = persist_chunks(&mut field, upload_dir, kind).await?;
                log::info!("stored upload for {kind} at {}", target.display());
                stored = Some(target);
            }

            _ => {}
        }
    }

    let entity = entity.ok_or("Missing json part")?;
    let path = stored.ok_or("Missing file")?;
    Ok((entity, path))
}

/// Streams `chunks` into `upload_dir` and names the file after their MD5
/// digest. A failed read or write leaves nothing behind.
async fn persist_chunks<S, E>(
    mut chunks: S,
    upload_dir: &Path,
    kind: EntityKind,
) -> Result<PathBuf, Box<dyn std::error::Error>>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: std::error::Error + 'static,
{
    fs::create_dir_all(upload_dir)?;
    let mut partial = tempfile::Builder::new()
        .prefix(&format!("{kind}."))
        .suffix(".part")
        .tempfile_in(upload_dir)?;

    let mut md5_hasher = Context::new();
    {
        let mut writer = BufWriter::new(partial.as_file_mut());
        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            md5_hasher.consume(&chunk);
            writer.write_all(&chunk)?;
        }
        writer.flush()?;
    }

    let digest = format!("{:x}", md5_hasher.finalize());
    let target = upload_dir.join(format!("{}_{}.csv", kind, digest));
    partial.persist(&target)?;
    Ok(target)
}
