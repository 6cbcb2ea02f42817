use chrono::{DateTime, Utc};

use crate::analysis::change_detector::{ChangeDetector, Threshold};
use crate::analysis::interval_aggregator::{IntervalAggregator, StagnantInterval};
use crate::analysis::sampler::Sampler;
use crate::common::{EntityId, FrameRange};
use crate::error::AnalysisError;
use crate::host::{ChannelSource, TimeCursor};

/// Inputs of one analysis pass.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    threshold: Threshold,
    range: FrameRange,
    entities: Vec<EntityId>,
}

impl AnalysisConfig {
    pub fn new(
        threshold: f64,
        range: FrameRange,
        entities: Vec<EntityId>,
    ) -> Result<Self, AnalysisError> {
        if entities.is_empty() {
            return Err(AnalysisError::EmptySelection);
        }
        Ok(Self {
            threshold: Threshold::new(threshold)?,
            range,
            entities,
        })
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    pub fn range(&self) -> FrameRange {
        self.range
    }

    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub range: FrameRange,
    pub intervals: Vec<StagnantInterval>,
    pub transitions_evaluated: u64,
    pub changed_transitions: u64,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisReport {
    /// Number of frames covered by stagnant intervals.
    pub fn stagnant_frames(&self) -> u64 {
        self.intervals.iter().map(StagnantInterval::frame_count).sum()
    }
}

/// Scans a frame range and folds it into stagnant intervals.
pub struct StagnationAnalyzer<'c> {
    config: &'c AnalysisConfig,
    detector: ChangeDetector,
}

impl<'c> StagnationAnalyzer<'c> {
    pub fn new(config: &'c AnalysisConfig) -> Self {
        Self {
            config,
            detector: ChangeDetector::new(config.threshold()),
        }
    }

    /// Runs the full scan. The host cursor is moved frame by frame and put back
    /// where it was afterwards; nothing else on the host is touched. On error
    /// no intervals are returned.
    pub fn run<H: ChannelSource + TimeCursor + ?Sized>(
        &self,
        host: &mut H,
    ) -> Result<AnalysisReport, AnalysisError> {
        let range = self.config.range();
        let entities = self.config.entities();
        tracing::info!(
            "Analyzing {} entities over {} with threshold {}",
            entities.len(),
            range,
            self.detector.threshold().value()
        );

        let mut sampler = Sampler::new(host);
        let mut aggregator = IntervalAggregator::new(range);
        let mut transitions_evaluated = 0;
        let mut changed_transitions = 0;

        sampler.seek(range.start())?;
        for frame in range.transitions() {
            sampler.seek(frame)?;
            let changed = self
                .detector
                .detect_change(sampler.source(), entities, frame)?;

            transitions_evaluated += 1;
            if changed {
                changed_transitions += 1;
            }
            aggregator.record(frame, changed);
        }

        let intervals = aggregator.finish();
        tracing::info!(
            "Found {} stagnant intervals ({} of {} transitions changed)",
            intervals.len(),
            changed_transitions,
            transitions_evaluated
        );

        Ok(AnalysisReport {
            range,
            intervals,
            transitions_evaluated,
            changed_transitions,
            analyzed_at: Utc::now(),
        })
    }
}
