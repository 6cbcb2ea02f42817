pub mod analysis;
pub mod common;
pub mod config;
pub mod error;
pub mod host;
pub mod markers;
pub mod tool;

pub use analysis::{AnalysisConfig, AnalysisReport, StagnantInterval, StagnationAnalyzer};
pub use error::{AnalysisError, AppError, HostError};

pub use host::{InMemoryScene, SceneHost};
pub use tool::TimingTool;
