//! Runtime configuration, read from `FOOD_WASTAGE_*` environment variables.

use crate::error::{ConfigError, UnknownImportMode};
use crate::import::ImportMode;
use serde::Serialize;
use std::env;
use std::path::PathBuf;

const DB_PATH: &str = "FOOD_WASTAGE_DB";
const DATA_DIR: &str = "FOOD_WASTAGE_DATA_DIR";
const UPLOAD_DIR: &str = "FOOD_WASTAGE_UPLOAD_DIR";
const HOST: &str = "FOOD_WASTAGE_HOST";
const PORT: &str = "FOOD_WASTAGE_PORT";
const IMPORT_MODE: &str = "FOOD_WASTAGE_IMPORT_MODE";
const IMPORT_ON_START: &str = "FOOD_WASTAGE_IMPORT_ON_START";
const NEAR_EXPIRY_DAYS: &str = "FOOD_WASTAGE_NEAR_EXPIRY_DAYS";

#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// Directory holding the four `*_data.csv` sources.
    pub data_dir: PathBuf,
    /// Where uploaded CSV files are written before import.
    pub upload_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub import_mode: ImportMode,
    /// Run a full import of `data_dir` before serving.
    pub import_on_start: bool,
    /// Window used by the near-expiry insight.
    pub near_expiry_days: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("food_wastage.db"),
            data_dir: PathBuf::from("data"),
            upload_dir: PathBuf::from("uploads"),
            host: "127.0.0.1".to_string(),
            port: 8080,
            import_mode: ImportMode::InsertOrSkip,
            import_on_start: false,
            near_expiry_days: 3,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup; unset keys keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(v) = lookup(DB_PATH) {
            config.database_path = PathBuf::from(v);
        }
        if let Some(v) = lookup(DATA_DIR) {
            config.data_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(UPLOAD_DIR) {
            config.upload_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(HOST) {
            config.host = v;
        }
        if let Some(v) = lookup(PORT) {
            config.port = v.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: PORT,
                    value: v.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(v) = lookup(IMPORT_MODE) {
            config.import_mode = v.parse().map_err(|e: UnknownImportMode| {
                ConfigError::InvalidValue {
                    key: IMPORT_MODE,
                    value: v.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(v) = lookup(IMPORT_ON_START) {
            config.import_on_start = parse_flag(&v).ok_or_else(|| ConfigError::InvalidValue {
                key: IMPORT_ON_START,
                value: v.clone(),
                reason: "expected true or false".to_string(),
            })?;
        }
        if let Some(v) = lookup(NEAR_EXPIRY_DAYS) {
            config.near_expiry_days = v.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidValue {
                    key: NEAR_EXPIRY_DAYS,
                    value: v.clone(),
                    reason: e.to_string(),
                }
            })?;
        }

        Ok(config)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
