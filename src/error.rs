use thiserror::Error;

use crate::common::frame::{Channel, EntityId, Frame};

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Analysis Error: {0}")]
    Analysis(#[from] AnalysisError),
    #[error("Configuration Error: {0}")]
    Config(#[from] ::config::ConfigError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to access scene file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse scene file: {0}")]
    SceneFormat(#[from] serde_json::Error),
}

// Errors raised by the analysis pass and the marker operations

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Please select at least one control.")]
    EmptySelection,
    #[error("Movement threshold must be a positive number, got {0}")]
    InvalidThreshold(f64),
    #[error("Invalid frame range: start {start} is after end {end}")]
    InvalidRange { start: Frame, end: Frame },
    #[error("Failed to read {entity}.{channel} at frame {frame}: {source}")]
    ChannelRead {
        entity: EntityId,
        channel: Channel,
        frame: Frame,
        #[source]
        source: HostError,
    },
    #[error("Failed to move cursor to frame {frame}: {source}")]
    Cursor {
        frame: Frame,
        #[source]
        source: HostError,
    },
    #[error("Marker operation failed: {0}")]
    Sink(#[source] HostError),
    #[error("Undo scope failed: {0}")]
    Transaction(#[source] HostError),
}

impl AnalysisError {
    /// Whether the user can fix this by changing the selection and retrying.
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, AnalysisError::EmptySelection)
    }
}

// Errors reported by a host collaborator

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("Entity {0} does not exist")]
    EntityNotFound(EntityId),
    #[error("Entity {entity} has no {channel} channel")]
    ChannelMissing { entity: EntityId, channel: Channel },
    #[error("No {channel} sample for {entity} at frame {frame}")]
    FrameOutOfRange {
        entity: EntityId,
        channel: Channel,
        frame: Frame,
    },
    #[error("Marker rejected: {0}")]
    MarkerRejected(String),
    #[error("An undo scope is already open")]
    ScopeAlreadyOpen,
    #[error("No undo scope is open")]
    NoOpenScope,
}
