use crate::common::{Channel, EntityId, Frame, FrameSample};
use crate::error::AnalysisError;
use crate::host::{ChannelSource, CursorGuard, TimeCursor};

/// Reads the three positional channels of `entity` at `frame`.
pub fn read_sample<S: ChannelSource + ?Sized>(
    source: &S,
    entity: &EntityId,
    frame: Frame,
) -> Result<FrameSample, AnalysisError> {
    let read = |channel: Channel| {
        source
            .read_channel(entity, channel, frame)
            .map_err(|err| AnalysisError::ChannelRead {
                entity: entity.clone(),
                channel,
                frame,
                source: err,
            })
    };

    Ok(FrameSample::new(
        read(Channel::TranslateX)?,
        read(Channel::TranslateY)?,
        read(Channel::TranslateZ)?,
    ))
}

/// Walks the host cursor through a range while sampling.
///
/// Holds the cursor for its whole lifetime and hands it back at the frame it
/// found it on when dropped, on success and failure alike.
pub struct Sampler<'a, H: ChannelSource + TimeCursor + ?Sized> {
    cursor: CursorGuard<'a, H>,
}

impl<'a, H: ChannelSource + TimeCursor + ?Sized> Sampler<'a, H> {
    pub fn new(host: &'a mut H) -> Self {
        Self {
            cursor: CursorGuard::acquire(host),
        }
    }

    pub fn seek(&mut self, frame: Frame) -> Result<(), AnalysisError> {
        self.cursor
            .set_current_frame(frame)
            .map_err(|source| AnalysisError::Cursor { frame, source })
    }

    pub fn sample(&self, entity: &EntityId, frame: Frame) -> Result<FrameSample, AnalysisError> {
        read_sample(self.source(), entity, frame)
    }

    pub fn source(&self) -> &H {
        &self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HostError;
    use crate::host::memory::{EntityTrack, InMemoryScene};

    fn scene() -> InMemoryScene {
        InMemoryScene::builder()
            .playback_range(1, 3)
            .current_frame(2)
            .entity(
                "ball",
                EntityTrack::new(1)
                    .with_channel(Channel::TranslateX, vec![0.0, 1.0, 2.0])
                    .with_channel(Channel::TranslateY, vec![5.0, 5.0, 5.0])
                    .with_channel(Channel::TranslateZ, vec![-1.0, -2.0, -3.0]),
            )
            .entity(
                "flat",
                EntityTrack::new(1).with_channel(Channel::TranslateX, vec![0.0, 0.0, 0.0]),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn samples_all_three_channels() {
        let scene = scene();
        let sample = read_sample(&scene, &"ball".into(), 3).unwrap();
        assert_eq!(sample, FrameSample::new(2.0, 5.0, -3.0));
    }

    #[test]
    fn missing_channel_is_a_read_failure() {
        let scene = scene();
        let err = read_sample(&scene, &"flat".into(), 1).unwrap_err();
        match err {
            AnalysisError::ChannelRead {
                entity,
                channel,
                frame,
                source,
            } => {
                assert_eq!(entity.as_str(), "flat");
                assert_eq!(channel, Channel::TranslateY);
                assert_eq!(frame, 1);
                assert!(matches!(source, HostError::ChannelMissing { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn sampler_restores_cursor() {
        let mut scene = scene();
        {
            let mut sampler = Sampler::new(&mut scene);
            sampler.seek(3).unwrap();
            assert_eq!(sampler.source().current_frame(), 3);
            assert_eq!(sampler.sample(&"ball".into(), 3).unwrap().x, 2.0);
        }
        assert_eq!(scene.current_frame(), 2);
    }
}
