use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const UNVERSIONED: &str = "unversioned";

/// Read-only source of calibrated decision thresholds.
pub trait ParamsStore {
    fn version(&self) -> String;
    fn weights(&self) -> HashMap<String, f64>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PersistedParams {
    #[serde(default = "default_version")]
    version: String,
    #[serde(default)]
    weights: HashMap<String, f64>,
}

fn default_version() -> String {
    UNVERSIONED.to_string()
}

impl Default for PersistedParams {
    fn default() -> Self {
        Self {
            version: default_version(),
            weights: HashMap::new(),
        }
    }
}

/// JSON-file parameter store: `{ "version": "...", "weights": { "key": 1.0 } }`.
#[derive(Debug, Clone)]
pub struct JsonParamsStore {
    path: PathBuf,
    data: PersistedParams,
}

impl JsonParamsStore {
    /// Load from `path`; a missing file yields an unversioned, empty store.
    pub fn open(path: &Path) -> Result<Self, AppError> {
        let data = if path.exists() {
            let payload = std::fs::read_to_string(path)?;
            serde_json::from_str(&payload)?
        } else {
            PersistedParams::default()
        };
        Ok(Self {
            path: path.to_path_buf(),
            data,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the stored parameters and write them back to disk.
    pub fn update(&mut self, version: &str, weights: HashMap<String, f64>) -> Result<(), AppError> {
        self.data = PersistedParams {
            version: version.to_string(),
            weights,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.data)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl ParamsStore for JsonParamsStore {
    fn version(&self) -> String {
        self.data.version.clone()
    }

    fn weights(&self) -> HashMap<String, f64> {
        self.data.weights.clone()
    }
}
