pub mod compiler;
pub mod manager;
pub mod stepping;
pub mod system;
pub mod traits;

pub use compiler::CompilerConfig;
pub use manager::{AppConfig, ConfigManager};
pub use stepping::SteppingConfig;
pub use system::{GlobalParameter, SystemConfig};
pub use traits::{ConfigManifest, ConfigSection, FieldManifest};
