pub mod analyzer;
pub mod change_detector;
pub mod interval_aggregator;
pub mod sampler;

pub use analyzer::{AnalysisConfig, AnalysisReport, StagnationAnalyzer};
pub use change_detector::{ChangeDetector, Threshold};
pub use interval_aggregator::{IntervalAggregator, StagnantInterval, StagnationState};
pub use sampler::Sampler;
