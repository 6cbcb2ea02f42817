use std::fmt;

use crate::common::{Frame, FrameRange};

/// Closed range of frames without significant motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StagnantInterval {
    start: Frame,
    end: Frame,
}

impl StagnantInterval {
    pub fn new(start: Frame, end: Frame) -> Self {
        debug_assert!(start <= end, "interval {start}..={end} is reversed");
        Self { start, end }
    }

    pub fn start(&self) -> Frame {
        self.start
    }

    pub fn end(&self) -> Frame {
        self.end
    }

    pub fn frame_count(&self) -> u64 {
        self.end.abs_diff(self.start).saturating_add(1)
    }
}

impl fmt::Display for StagnantInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagnationState {
    NotStagnant,
    Stagnant { since: Frame },
}

/// Folds the per-frame change stream of one range into stagnant intervals.
///
/// An unchanged transition `t - 1 -> t` opens (or extends) a stagnant period
/// that includes both frames; a changed one closes it at `t - 1`. Every frame
/// after `range.start()` must be recorded once, in ascending order. `finish`
/// closes whatever is still open at `range.end()`. A single-frame range has no
/// transitions and is reported as one interval.
#[derive(Debug)]
pub struct IntervalAggregator {
    range: FrameRange,
    state: StagnationState,
    last_frame: Frame,
    intervals: Vec<StagnantInterval>,
}

impl IntervalAggregator {
    pub fn new(range: FrameRange) -> Self {
        Self {
            range,
            state: StagnationState::NotStagnant,
            last_frame: range.start(),
            intervals: Vec::new(),
        }
    }

    pub fn state(&self) -> StagnationState {
        self.state
    }

    /// Records whether the transition `frame - 1 -> frame` was a significant change.
    pub fn record(&mut self, frame: Frame, changed: bool) {
        debug_assert_eq!(frame, self.last_frame + 1, "frames must be recorded in order");
        debug_assert!(frame <= self.range.end());
        self.last_frame = frame;

        match (self.state, changed) {
            (StagnationState::Stagnant { since }, true) => {
                let interval = StagnantInterval::new(since, frame - 1);
                tracing::debug!("Stagnant interval closed: {}", interval);
                self.intervals.push(interval);
                self.state = StagnationState::NotStagnant;
            }
            (StagnationState::NotStagnant, false) => {
                self.state = StagnationState::Stagnant { since: frame - 1 };
            }
            (StagnationState::NotStagnant, true) | (StagnationState::Stagnant { .. }, false) => {}
        }
    }

    pub fn finish(mut self) -> Vec<StagnantInterval> {
        match self.state {
            StagnationState::Stagnant { since } => {
                self.intervals
                    .push(StagnantInterval::new(since, self.range.end()));
            }
            StagnationState::NotStagnant if self.range.start() == self.range.end() => {
                self.intervals
                    .push(StagnantInterval::new(self.range.start(), self.range.end()));
            }
            StagnationState::NotStagnant => {}
        }
        self.intervals
    }
}

/// Folds a complete change stream, one flag per transition of `range`, in order.
pub fn fold_changes<I>(range: FrameRange, changes: I) -> Vec<StagnantInterval>
where
    I: IntoIterator<Item = bool>,
{
    let mut aggregator = IntervalAggregator::new(range);
    for (frame, changed) in range.transitions().zip(changes) {
        aggregator.record(frame, changed);
    }
    aggregator.finish()
}
