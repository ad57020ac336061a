use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::LSystemError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalParameter {
    pub name: String,
    pub value: f64,
}

/// The grammar being run: axiom, rules, and global parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub axiom: String,
    pub rules: Vec<String>,
    pub global_parameters: Vec<GlobalParameter>,
    pub iterations: usize,
    pub seed: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            axiom: "A".to_string(),
            rules: vec!["A -> AB".to_string(), "B -> A".to_string()],
            global_parameters: Vec::new(),
            iterations: 5,
            seed: 0,
        }
    }
}

impl SystemConfig {
    pub fn global_names(&self) -> Vec<String> {
        self.global_parameters.iter().map(|p| p.name.clone()).collect()
    }

    pub fn global_values(&self) -> Vec<f64> {
        self.global_parameters.iter().map(|p| p.value).collect()
    }
}

impl ConfigSection for SystemConfig {
    fn section_name() -> &'static str {
        "system"
    }

    fn validate(&self) -> Result<(), LSystemError> {
        if self.axiom.trim().is_empty() {
            return Err(LSystemError::Configuration(
                "Axiom must not be empty".to_string(),
            ));
        }
        let mut seen: Vec<&str> = Vec::new();
        for parameter in &self.global_parameters {
            if seen.contains(&parameter.name.as_str()) {
                return Err(LSystemError::Configuration(format!(
                    "Global parameter '{}' is declared twice",
                    parameter.name
                )));
            }
            seen.push(&parameter.name);
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "System".to_string(),
            fields: vec![
                FieldManifest::new("axiom", "string", serde_json::json!("A"), "Initial symbol string"),
                FieldManifest::new(
                    "rules",
                    "string[]",
                    serde_json::json!(["A -> AB", "B -> A"]),
                    "Production rules",
                ),
                FieldManifest::new(
                    "global_parameters",
                    "table[]",
                    serde_json::json!([]),
                    "Named values visible to every rule expression",
                ),
                FieldManifest::new(
                    "iterations",
                    "integer",
                    serde_json::json!(5),
                    "Generations to step",
                )
                .with_range(0.0, 10_000.0),
                FieldManifest::new("seed", "integer", serde_json::json!(0), "Stochastic seed"),
            ],
        }
    }
}
