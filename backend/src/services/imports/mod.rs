//! CSV import endpoints.
//!
//! - `POST /api/imports/upload`: multipart/form-data with a `json` field naming
//!   the target entity (`{"entity": "food_listings"}`) followed by a `file`
//!   field holding the CSV. The file is saved under the upload directory with a
//!   name derived from its MD5 hash and imported by a background job. The
//!   response body is the job id.
//!
//! - `POST /api/imports/run`: imports the four sources of the configured data
//!   directory in dependency order, as a background job.
//!
//! - `GET /api/imports/status/{job_id}`: current `JobStatus` of a job. A
//!   completed import carries its reports as JSON.

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod get_status;
pub(crate) mod job;
mod run;
mod upload;

const API_PATH: &str = "/api/imports";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/upload", post().to(upload::process))
        .route("/run", post().to(run::process))
        .route("/status/{job_id}", get().to(get_status::process))
}
