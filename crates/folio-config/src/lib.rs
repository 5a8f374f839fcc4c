pub mod config;
pub mod diagrams;
pub mod error;
pub mod storage;
pub mod templates;

pub use config::Config;
pub use diagrams::DiagramsConfig;
pub use error::ConfigError;
pub use storage::StorageConfig;
