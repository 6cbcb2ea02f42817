use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

use crate::error::AnalysisError;

/// Integer frame number on the host timeline.
pub type Frame = i64;

/// Handle to a scene object, resolved once from the selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The positional channels sampled for every tracked entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    #[serde(rename = "translateX")]
    TranslateX,
    #[serde(rename = "translateY")]
    TranslateY,
    #[serde(rename = "translateZ")]
    TranslateZ,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::TranslateX, Channel::TranslateY, Channel::TranslateZ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::TranslateX => "translateX",
            Channel::TranslateY => "translateY",
            Channel::TranslateZ => "translateZ",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of one entity at one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl FrameSample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::TranslateX => self.x,
            Channel::TranslateY => self.y,
            Channel::TranslateZ => self.z,
        }
    }

    /// True if any channel differs from `previous` by strictly more than `threshold`.
    pub fn moved_beyond(&self, previous: &FrameSample, threshold: f64) -> bool {
        Channel::ALL
            .iter()
            .any(|&channel| (self.get(channel) - previous.get(channel)).abs() > threshold)
    }
}

/// Inclusive frame range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FrameBounds", into = "FrameBounds")]
pub struct FrameRange {
    start: Frame,
    end: Frame,
}

impl FrameRange {
    pub fn new(start: Frame, end: Frame) -> Result<Self, AnalysisError> {
        if start > end {
            return Err(AnalysisError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Frame {
        self.start
    }

    pub fn end(&self) -> Frame {
        self.end
    }

    pub fn frames(&self) -> RangeInclusive<Frame> {
        self.start..=self.end
    }

    /// Frames `t` for which the transition `t - 1 -> t` lies inside the range.
    pub fn transitions(&self) -> impl Iterator<Item = Frame> {
        self.frames().skip(1)
    }

    pub fn frame_count(&self) -> u64 {
        self.end.abs_diff(self.start).saturating_add(1)
    }
}

impl fmt::Display for FrameRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

// Wire shape of a range in scene files
#[derive(Serialize, Deserialize)]
struct FrameBounds {
    start: Frame,
    end: Frame,
}

impl TryFrom<FrameBounds> for FrameRange {
    type Error = AnalysisError;

    fn try_from(bounds: FrameBounds) -> Result<Self, Self::Error> {
        FrameRange::new(bounds.start, bounds.end)
    }
}

impl From<FrameRange> for FrameBounds {
    fn from(range: FrameRange) -> Self {
        Self {
            start: range.start,
            end: range.end,
        }
    }
}
