//! JSON-file alarm repository.
//!
//! The whole alarm list is persisted as one pretty-printed JSON array so the
//! store file stays hand-editable. Loading never fails: a missing file is
//! bootstrapped to an empty list and a corrupt one is logged and replaced by
//! an empty list, because an empty store the user can repopulate beats a
//! crash-looping background process.

use anyhow::Result;
use log::{error, info};
use std::fs;

use super::connection::JsonConnection;
use shared::Alarm;

/// File-backed storage for the alarm list.
#[derive(Clone)]
pub struct AlarmRepository {
    connection: JsonConnection,
}

impl AlarmRepository {
    pub fn new(connection: JsonConnection) -> Self {
        Self { connection }
    }

    /// Load the full alarm list.
    ///
    /// Never propagates an error: a missing file is created empty on the
    /// spot, and unreadable or corrupt content degrades to an empty list
    /// with the failure logged.
    pub async fn load_alarms(&self) -> Vec<Alarm> {
        let path = self.connection.alarms_file_path();

        if !path.exists() {
            info!(
                "No alarm store at {} - bootstrapping an empty one",
                path.display()
            );
            if let Err(e) = self.save_alarms(&[]).await {
                error!("Failed to bootstrap alarm store: {}", e);
            }
            return Vec::new();
        }

        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                error!(
                    "Failed to read alarm store {}: {} - continuing with an empty list",
                    path.display(),
                    e
                );
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(alarms) => alarms,
            Err(e) => {
                error!(
                    "Alarm store {} is corrupt: {} - continuing with an empty list",
                    path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Persist the full alarm list, replacing the store file.
    ///
    /// The content goes to a temp file first and is renamed into place, so a
    /// concurrent reader sees either the old list or the new one, never a
    /// torn file.
    pub async fn save_alarms(&self, alarms: &[Alarm]) -> Result<()> {
        let path = self.connection.alarms_file_path();
        let json = serde_json::to_string_pretty(alarms)?;

        // Atomic write using temp file
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json)?;
        fs::rename(&temp_path, &path)?;

        Ok(())
    }
}
