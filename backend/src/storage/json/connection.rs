//! JSON store connection: owns the data directory and the store file path.

use anyhow::Result;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the single store file.
const ALARMS_FILE_NAME: &str = "alarms.json";

/// Environment variable overriding the data directory location.
const DATA_DIR_ENV: &str = "ALARM_CLOCK_DATA_DIR";

/// JsonConnection manages the directory holding the alarm store file.
#[derive(Clone)]
pub struct JsonConnection {
    base_directory: PathBuf,
}

impl JsonConnection {
    /// Create a connection rooted at an explicit directory, creating the
    /// directory if it doesn't exist.
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    /// Create a connection in the default per-user data directory.
    ///
    /// Uses `~/Documents/Calendar Alarm Clock`, unless the
    /// `ALARM_CLOCK_DATA_DIR` environment variable points somewhere else.
    pub fn new_default() -> Result<Self> {
        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            let dir = dir.trim().to_string();
            if !dir.is_empty() {
                info!("Using data directory from {}: {}", DATA_DIR_ENV, dir);
                return Self::new(dir);
            }
        }

        let home_dir = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| anyhow::anyhow!("Could not determine home directory"))?;

        let data_dir = PathBuf::from(home_dir)
            .join("Documents")
            .join("Calendar Alarm Clock");
        info!("Using default data directory: {}", data_dir.display());
        Self::new(data_dir)
    }

    /// Path of the alarm store file.
    pub fn alarms_file_path(&self) -> PathBuf {
        self.base_directory.join(ALARMS_FILE_NAME)
    }

    /// The data directory this connection is rooted at.
    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }
}
