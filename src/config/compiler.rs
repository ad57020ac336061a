use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::engines::rules::DEFAULT_PROBABILITY_EPSILON;
use crate::error::LSystemError;
use crate::symbols::RESERVED_CHARACTERS;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    pub branch_open: char,
    pub branch_close: char,
    /// Symbols that context matching looks through.
    pub ignored_symbols: String,
    /// Allowed distance from 1 of a stochastic group's probability sum.
    pub probability_epsilon: f64,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            branch_open: '[',
            branch_close: ']',
            ignored_symbols: String::new(),
            probability_epsilon: DEFAULT_PROBABILITY_EPSILON,
        }
    }
}

impl ConfigSection for CompilerConfig {
    fn section_name() -> &'static str {
        "compiler"
    }

    fn validate(&self) -> Result<(), LSystemError> {
        if self.branch_open == self.branch_close {
            return Err(LSystemError::Configuration(
                "Branch open and close symbols must differ".to_string(),
            ));
        }
        for c in [self.branch_open, self.branch_close] {
            if RESERVED_CHARACTERS.contains(&c) || c.is_whitespace() {
                return Err(LSystemError::Configuration(format!(
                    "'{}' cannot be used as a branch symbol",
                    c
                )));
            }
        }
        if let Some(c) = self
            .ignored_symbols
            .chars()
            .find(|c| *c == self.branch_open || *c == self.branch_close)
        {
            return Err(LSystemError::Configuration(format!(
                "Branch symbol '{}' cannot be ignored",
                c
            )));
        }
        if !(self.probability_epsilon >= 0.0 && self.probability_epsilon < 1.0) {
            return Err(LSystemError::Configuration(
                "Probability epsilon must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Compiler".to_string(),
            fields: vec![
                FieldManifest::new(
                    "branch_open",
                    "char",
                    serde_json::json!("["),
                    "Symbol that opens a branch",
                ),
                FieldManifest::new(
                    "branch_close",
                    "char",
                    serde_json::json!("]"),
                    "Symbol that closes a branch",
                ),
                FieldManifest::new(
                    "ignored_symbols",
                    "string",
                    serde_json::json!(""),
                    "Symbols invisible to context matching",
                ),
                FieldManifest::new(
                    "probability_epsilon",
                    "float",
                    serde_json::json!(DEFAULT_PROBABILITY_EPSILON),
                    "Tolerance on stochastic probability sums",
                )
                .with_range(0.0, 1.0),
            ],
        }
    }
}
