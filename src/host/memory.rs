use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::analysis::StagnantInterval;
use crate::common::{Channel, EntityId, Frame, FrameRange};
use crate::error::{AnalysisError, AppError, HostError};
use crate::host::{ChannelSource, MarkerSink, SceneHost, TimeCursor, UndoScope};
use crate::markers::{DEFAULT_MARKER_PREFIX, Marker, MarkerColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    #[default]
    Transform,
    Other,
}

/// Baked per-frame channel values of one entity, starting at `first_frame`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityTrack {
    #[serde(default)]
    pub kind: EntityKind,
    pub first_frame: Frame,
    #[serde(default)]
    pub channels: IndexMap<Channel, Vec<f64>>,
}

impl EntityTrack {
    pub fn new(first_frame: Frame) -> Self {
        Self {
            kind: EntityKind::Transform,
            first_frame,
            channels: IndexMap::new(),
        }
    }

    pub fn with_channel(mut self, channel: Channel, values: Vec<f64>) -> Self {
        self.channels.insert(channel, values);
        self
    }
}

// State captured when an undo scope opens
#[derive(Debug, Clone)]
struct SceneSnapshot {
    label: String,
    markers: Vec<Marker>,
    current_frame: Frame,
}

/// A self-contained scene host backed by baked channel data.
///
/// Loaded from and saved to JSON by the command line tool; also the host used
/// throughout the tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InMemoryScene {
    playback_range: FrameRange,
    #[serde(default)]
    current_frame: Frame,
    #[serde(default)]
    selection: Vec<EntityId>,
    #[serde(default)]
    entities: IndexMap<EntityId, EntityTrack>,
    #[serde(default)]
    markers: Vec<Marker>,
    #[serde(default = "default_marker_prefix", skip_serializing)]
    marker_prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    marker_capacity: Option<usize>,
    #[serde(skip)]
    marker_support_loaded: bool,
    #[serde(skip)]
    open_scope: Option<SceneSnapshot>,
    #[serde(skip)]
    undo_stack: Vec<SceneSnapshot>,
}

fn default_marker_prefix() -> String {
    DEFAULT_MARKER_PREFIX.to_string()
}

impl InMemoryScene {
    pub fn builder() -> InMemorySceneBuilder {
        InMemorySceneBuilder::default()
    }

    pub fn from_json_file(path: &Path) -> Result<Self, AppError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn save_json_file(&self, path: &Path) -> Result<(), AppError> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn set_marker_prefix(&mut self, prefix: impl Into<String>) {
        self.marker_prefix = prefix.into();
    }

    pub fn remove_entity(&mut self, entity: &EntityId) -> Option<EntityTrack> {
        self.entities.shift_remove(entity)
    }

    pub fn is_marker_support_loaded(&self) -> bool {
        self.marker_support_loaded
    }

    /// Number of committed scopes that can be undone.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Reverts the marker set to before the last committed scope, returning its label.
    pub fn undo(&mut self) -> Result<Option<String>, HostError> {
        if self.open_scope.is_some() {
            return Err(HostError::ScopeAlreadyOpen);
        }
        Ok(self.undo_stack.pop().map(|snapshot| {
            tracing::info!("Undo '{}'", snapshot.label);
            self.markers = snapshot.markers;
            snapshot.label
        }))
    }
}

impl ChannelSource for InMemoryScene {
    fn read_channel(
        &self,
        entity: &EntityId,
        channel: Channel,
        frame: Frame,
    ) -> Result<f64, HostError> {
        let track = self
            .entities
            .get(entity)
            .ok_or_else(|| HostError::EntityNotFound(entity.clone()))?;
        let values = track
            .channels
            .get(&channel)
            .ok_or_else(|| HostError::ChannelMissing {
                entity: entity.clone(),
                channel,
            })?;

        frame
            .checked_sub(track.first_frame)
            .and_then(|offset| usize::try_from(offset).ok())
            .and_then(|index| values.get(index))
            .copied()
            .ok_or_else(|| HostError::FrameOutOfRange {
                entity: entity.clone(),
                channel,
                frame,
            })
    }
}

impl TimeCursor for InMemoryScene {
    fn current_frame(&self) -> Frame {
        self.current_frame
    }

    fn set_current_frame(&mut self, frame: Frame) -> Result<(), HostError> {
        self.current_frame = frame;
        Ok(())
    }
}

impl MarkerSink for InMemoryScene {
    fn ensure_marker_support(&mut self) -> Result<(), HostError> {
        if !self.marker_support_loaded {
            tracing::debug!("Loading timeline marker support");
            self.marker_support_loaded = true;
        }
        Ok(())
    }

    fn markers(&self) -> &[Marker] {
        &self.markers
    }

    fn clear_all_markers(&mut self) -> Result<usize, HostError> {
        let removed = self.markers.len();
        self.markers.clear();
        Ok(removed)
    }

    fn create_marker(
        &mut self,
        interval: StagnantInterval,
        color: MarkerColor,
    ) -> Result<(), HostError> {
        if let Some(capacity) = self.marker_capacity {
            if self.markers.len() >= capacity {
                return Err(HostError::MarkerRejected(format!(
                    "scene holds at most {} markers",
                    capacity
                )));
            }
        }
        self.markers
            .push(Marker::new(&self.marker_prefix, interval, color));
        Ok(())
    }
}

impl UndoScope for InMemoryScene {
    fn open_scope(&mut self, label: &str) -> Result<(), HostError> {
        if self.open_scope.is_some() {
            return Err(HostError::ScopeAlreadyOpen);
        }
        self.open_scope = Some(SceneSnapshot {
            label: label.to_string(),
            markers: self.markers.clone(),
            current_frame: self.current_frame,
        });
        Ok(())
    }

    fn commit_scope(&mut self) -> Result<(), HostError> {
        let snapshot = self.open_scope.take().ok_or(HostError::NoOpenScope)?;
        self.undo_stack.push(snapshot);
        Ok(())
    }

    fn rollback_scope(&mut self) -> Result<(), HostError> {
        let snapshot = self.open_scope.take().ok_or(HostError::NoOpenScope)?;
        self.markers = snapshot.markers;
        self.current_frame = snapshot.current_frame;
        Ok(())
    }
}

impl SceneHost for InMemoryScene {
    fn selection(&self) -> Vec<EntityId> {
        self.selection
            .iter()
            .filter(|id| {
                self.entities
                    .get(*id)
                    .is_some_and(|track| track.kind == EntityKind::Transform)
            })
            .cloned()
            .collect()
    }

    fn playback_range(&self) -> FrameRange {
        self.playback_range
    }
}

#[derive(Debug, Default)]
pub struct InMemorySceneBuilder {
    playback_range: Option<(Frame, Frame)>,
    current_frame: Option<Frame>,
    selection: Vec<EntityId>,
    entities: IndexMap<EntityId, EntityTrack>,
    markers: Vec<Marker>,
    marker_prefix: Option<String>,
    marker_capacity: Option<usize>,
}

impl InMemorySceneBuilder {
    pub fn playback_range(mut self, start: Frame, end: Frame) -> Self {
        self.playback_range = Some((start, end));
        self
    }

    // Defaults to the start of the playback range.
    pub fn current_frame(mut self, frame: Frame) -> Self {
        self.current_frame = Some(frame);
        self
    }

    pub fn entity(mut self, id: impl Into<EntityId>, track: EntityTrack) -> Self {
        self.entities.insert(id.into(), track);
        self
    }

    pub fn select(mut self, id: impl Into<EntityId>) -> Self {
        self.selection.push(id.into());
        self
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }

    pub fn marker_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.marker_prefix = Some(prefix.into());
        self
    }

    pub fn marker_capacity(mut self, capacity: usize) -> Self {
        self.marker_capacity = Some(capacity);
        self
    }

    pub fn build(self) -> Result<InMemoryScene, AnalysisError> {
        let (start, end) = self.playback_range.unwrap_or((1, 1));
        let playback_range = FrameRange::new(start, end)?;
        Ok(InMemoryScene {
            playback_range,
            current_frame: self.current_frame.unwrap_or(start),
            selection: self.selection,
            entities: self.entities,
            markers: self.markers,
            marker_prefix: self.marker_prefix.unwrap_or_else(default_marker_prefix),
            marker_capacity: self.marker_capacity,
            marker_support_loaded: false,
            open_scope: None,
            undo_stack: Vec::new(),
        })
    }
}
