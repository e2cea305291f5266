//! Domain types shared between the import pipeline, its HTTP surface and any
//! read-only consumer of the food wastage database.

pub mod jobs;
pub mod model;
pub mod requests;
