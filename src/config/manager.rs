use super::{
    compiler::CompilerConfig, stepping::SteppingConfig, system::SystemConfig, traits::ConfigSection,
};
use crate::error::LSystemError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

pub const ENV_PREFIX: &str = "LSYSTEM";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub system: SystemConfig,
    pub compiler: CompilerConfig,
    pub stepping: SteppingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), LSystemError> {
        self.system.validate()?;
        self.compiler.validate()?;
        self.stepping.validate()?;
        Ok(())
    }

    pub fn manifests(&self) -> Vec<super::traits::ConfigManifest> {
        vec![
            self.system.to_manifest(),
            self.compiler.to_manifest(),
            self.stepping.to_manifest(),
        ]
    }
}

#[derive(Debug, Default)]
pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), LSystemError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| LSystemError::Configuration(format!("Failed to read config: {}", e)))?;
        self.load_from_str(&contents)
    }

    pub fn load_from_str(&self, contents: &str) -> Result<(), LSystemError> {
        let config: AppConfig = toml::from_str(contents)
            .map_err(|e| LSystemError::Configuration(format!("Failed to parse config: {}", e)))?;
        self.replace(config)
    }

    /// Loads `path` with `LSYSTEM_<SECTION>__<FIELD>` environment variables layered on top.
    pub fn load_layered<P: AsRef<Path>>(&self, path: P) -> Result<(), LSystemError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| LSystemError::Configuration(format!("Failed to load config: {}", e)))?;
        let config: AppConfig = settings
            .try_deserialize()
            .map_err(|e| LSystemError::Configuration(format!("Failed to parse config: {}", e)))?;
        self.replace(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), LSystemError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| LSystemError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| LSystemError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        match self.config.read() {
            Ok(config) => config.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update<F>(&self, f: F) -> Result<(), LSystemError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut candidate = self.get();
        f(&mut candidate);
        self.replace(candidate)
    }

    fn replace(&self, config: AppConfig) -> Result<(), LSystemError> {
        config.validate()?;
        let mut guard = self
            .config
            .write()
            .map_err(|_| LSystemError::Configuration("Config lock poisoned".to_string()))?;
        *guard = config;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let manager = ConfigManager::new();
        manager
            .load_from_str(
                r#"
[system]
axiom = "B"
rules = ["A -> AB", "B -> A"]

[stepping]
batch_size = 8
"#,
            )
            .unwrap();
        let config = manager.get();
        assert_eq!(config.system.axiom, "B");
        assert_eq!(config.stepping.batch_size, 8);
        assert!(config.stepping.parallel);
        assert_eq!(config.compiler.branch_open, '[');
    }

    #[test]
    fn test_invalid_update_is_rolled_back() {
        let manager = ConfigManager::new();
        let result = manager.update(|c| c.stepping.batch_size = 0);
        assert!(result.is_err());
        assert_eq!(manager.get().stepping.batch_size, 512);
    }

    #[test]
    fn test_ignoring_branch_symbol_is_rejected() {
        let mut config = AppConfig::default();
        config.compiler.ignored_symbols = "F[".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trip_through_toml() {
        let dir = std::env::temp_dir().join("lsystem_engine_config_test.toml");
        let manager = ConfigManager::new();
        manager
            .update(|c| {
                c.system.seed = 42;
                c.compiler.ignored_symbols = "+-".to_string();
            })
            .unwrap();
        manager.save_to_file(&dir).unwrap();

        let loaded = ConfigManager::new();
        loaded.load_from_file(&dir).unwrap();
        assert_eq!(loaded.get(), manager.get());
        let _ = std::fs::remove_file(&dir);
    }
}
