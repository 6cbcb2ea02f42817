pub mod color;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::StagnantInterval;
use crate::common::Frame;

pub use color::{COLOR_CHANNEL_MAX, COLOR_CHANNEL_MIN, MarkerColor};

pub const DEFAULT_MARKER_PREFIX: &str = "Stagnant";

/// Display name encoding the interval, e.g. `Stagnant_1_4`.
pub fn marker_name(prefix: &str, interval: &StagnantInterval) -> String {
    format!("{}_{}_{}", prefix, interval.start(), interval.end())
}

/// A timeline marker for one stagnant interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: Uuid,
    pub name: String,
    pub color: MarkerColor,
    pub time_range_start: Frame,
    pub time_range_stop: Frame,
}

impl Marker {
    pub fn new(prefix: &str, interval: StagnantInterval, color: MarkerColor) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: marker_name(prefix, &interval),
            color,
            time_range_start: interval.start(),
            time_range_stop: interval.end(),
        }
    }

    pub fn interval(&self) -> StagnantInterval {
        StagnantInterval::new(self.time_range_start, self.time_range_stop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_carries_interval_bounds() {
        let marker = Marker::new(
            DEFAULT_MARKER_PREFIX,
            StagnantInterval::new(5, 10),
            MarkerColor::new(0.3, 0.4, 0.5),
        );
        assert_eq!(marker.name, "Stagnant_5_10");
        assert_eq!(marker.time_range_start, 5);
        assert_eq!(marker.time_range_stop, 10);
        assert_eq!(marker.interval(), StagnantInterval::new(5, 10));
    }

    #[test]
    fn name_handles_negative_frames() {
        assert_eq!(marker_name("Hold", &StagnantInterval::new(-4, -1)), "Hold_-4_-1");
    }
}
