use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::LSystemError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteppingConfig {
    /// Run the match and write phases on rayon workers.
    pub parallel: bool,
    /// Positions of the old generation handled per task.
    pub batch_size: usize,
    /// Size of a dedicated worker pool. `None` uses the global rayon pool.
    pub worker_threads: Option<usize>,
}

impl Default for SteppingConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            batch_size: 512,
            worker_threads: None,
        }
    }
}

impl ConfigSection for SteppingConfig {
    fn section_name() -> &'static str {
        "stepping"
    }

    fn validate(&self) -> Result<(), LSystemError> {
        if self.batch_size == 0 {
            return Err(LSystemError::Configuration(
                "Batch size must be at least 1".to_string(),
            ));
        }
        if self.worker_threads == Some(0) {
            return Err(LSystemError::Configuration(
                "Worker thread count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Stepping".to_string(),
            fields: vec![
                FieldManifest::new(
                    "parallel",
                    "boolean",
                    serde_json::json!(true),
                    "Run matching and writing on worker threads",
                ),
                FieldManifest::new(
                    "batch_size",
                    "integer",
                    serde_json::json!(512),
                    "Symbols processed per parallel task",
                )
                .with_range(1.0, 1_000_000.0),
                FieldManifest::new(
                    "worker_threads",
                    "integer",
                    serde_json::Value::Null,
                    "Dedicated worker pool size, empty for the global pool",
                )
                .with_range(1.0, 1024.0),
            ],
        }
    }
}
