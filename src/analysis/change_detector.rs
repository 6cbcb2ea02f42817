use std::ops::RangeInclusive;

use crate::analysis::sampler::read_sample;
use crate::common::{EntityId, Frame};
use crate::error::AnalysisError;
use crate::host::ChannelSource;

/// Range the threshold control offers; other positive values still work.
pub const PRACTICAL_THRESHOLD_RANGE: RangeInclusive<f64> = 0.01..=10.0;

/// Minimum per-frame, per-channel delta that counts as significant motion.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Threshold(f64);

impl Threshold {
    pub fn new(value: f64) -> Result<Self, AnalysisError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(AnalysisError::InvalidThreshold(value));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn is_practical(&self) -> bool {
        PRACTICAL_THRESHOLD_RANGE.contains(&self.0)
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(1.0)
    }
}

pub struct ChangeDetector {
    threshold: Threshold,
}

impl ChangeDetector {
    pub fn new(threshold: Threshold) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    /// Detect if any entity moved more than the threshold between `frame - 1` and `frame`.
    ///
    /// Stops at the first entity that moved. Any failed read aborts with
    /// `AnalysisError::ChannelRead`.
    pub fn detect_change<S: ChannelSource + ?Sized>(
        &self,
        source: &S,
        entities: &[EntityId],
        frame: Frame,
    ) -> Result<bool, AnalysisError> {
        for entity in entities {
            let previous = read_sample(source, entity, frame - 1)?;
            let current = read_sample(source, entity, frame)?;

            if current.moved_beyond(&previous, self.threshold.value()) {
                tracing::debug!("{} moved at frame {}", entity, frame);
                return Ok(true);
            }
        }
        Ok(false)
    }
}
