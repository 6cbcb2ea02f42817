pub mod memory;
pub mod scope;

use crate::analysis::StagnantInterval;
use crate::common::{Channel, EntityId, Frame, FrameRange};
use crate::error::HostError;
use crate::markers::{Marker, MarkerColor};

pub use memory::InMemoryScene;
pub use scope::{CursorGuard, TransactionScope};

/// Reads animated channel values from the host's evaluation engine.
pub trait ChannelSource {
    fn read_channel(
        &self,
        entity: &EntityId,
        channel: Channel,
        frame: Frame,
    ) -> Result<f64, HostError>;
}

/// The host's process-wide current-time cursor.
pub trait TimeCursor {
    fn current_frame(&self) -> Frame;
    fn set_current_frame(&mut self, frame: Frame) -> Result<(), HostError>;
}

/// Receives the markers produced by an analysis.
pub trait MarkerSink {
    /// Makes marker creation possible, e.g. by loading the host plugin that provides them.
    fn ensure_marker_support(&mut self) -> Result<(), HostError> {
        Ok(())
    }

    fn markers(&self) -> &[Marker];

    /// Removes every existing marker, returning how many were removed.
    fn clear_all_markers(&mut self) -> Result<usize, HostError>;

    fn create_marker(
        &mut self,
        interval: StagnantInterval,
        color: MarkerColor,
    ) -> Result<(), HostError>;
}

/// Groups mutations into one undoable unit.
///
/// Everything done between `open_scope` and `commit_scope` is undone as a
/// whole; `rollback_scope` reverts it immediately.
pub trait UndoScope {
    fn open_scope(&mut self, label: &str) -> Result<(), HostError>;
    fn commit_scope(&mut self) -> Result<(), HostError>;
    fn rollback_scope(&mut self) -> Result<(), HostError>;
}

/// Everything the timing tool needs from the host application.
pub trait SceneHost: ChannelSource + TimeCursor + MarkerSink + UndoScope {
    /// Currently selected transform entities, in selection order.
    fn selection(&self) -> Vec<EntityId>;

    /// The configured playback range.
    fn playback_range(&self) -> FrameRange;
}
