pub mod frame;

pub use frame::{Channel, EntityId, Frame, FrameRange, FrameSample};
