//! Service configuration
//!
//! Everything comes from environment variables with workable defaults,
//! so the binary runs out of the box against `./data` and `./db.sqlite3`.

use crate::error::{AppError, Result};
use std::env;
use std::path::PathBuf;

/// Snapshot file names probed inside the data directory, in order
const SNAPSHOT_CANDIDATES: &[&str] = &[
    "stocks.json",
    "stock_market_data.json",
    "stock_market_data.csv",
];

/// Service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Read configuration from the environment
    pub fn from_env() -> Result<Self> {
        let host = env::var("TRADEBOOK_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = match env::var("TRADEBOOK_PORT") {
            Ok(v) => v
                .parse::<u16>()
                .map_err(|_| AppError::Config(format!("invalid TRADEBOOK_PORT: {}", v)))?,
            Err(_) => 8000,
        };

        let database_path = env::var("TRADEBOOK_DB")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("db.sqlite3"));

        let data_dir = env::var("TRADEBOOK_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        Ok(Self {
            host,
            port,
            database_path,
            data_dir,
        })
    }

    /// Resolve the snapshot file: the first candidate that exists, or the
    /// first name if none do (the store reports it unavailable on read)
    pub fn snapshot_file(&self) -> PathBuf {
        SNAPSHOT_CANDIDATES
            .iter()
            .map(|name| self.data_dir.join(name))
            .find(|path| path.exists())
            .unwrap_or_else(|| self.data_dir.join(SNAPSHOT_CANDIDATES[0]))
    }
}
