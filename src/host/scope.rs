use std::ops::{Deref, DerefMut};

use crate::common::Frame;
use crate::error::HostError;
use crate::host::{TimeCursor, UndoScope};

/// Exclusive use of the host cursor; the previous frame is restored on drop.
pub struct CursorGuard<'a, H: TimeCursor + ?Sized> {
    host: &'a mut H,
    saved_frame: Frame,
}

impl<'a, H: TimeCursor + ?Sized> CursorGuard<'a, H> {
    pub fn acquire(host: &'a mut H) -> Self {
        let saved_frame = host.current_frame();
        Self { host, saved_frame }
    }

    pub fn saved_frame(&self) -> Frame {
        self.saved_frame
    }
}

impl<H: TimeCursor + ?Sized> Deref for CursorGuard<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: TimeCursor + ?Sized> DerefMut for CursorGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: TimeCursor + ?Sized> Drop for CursorGuard<'_, H> {
    fn drop(&mut self) {
        if let Err(e) = self.host.set_current_frame(self.saved_frame) {
            tracing::warn!("Failed to restore cursor to frame {}: {}", self.saved_frame, e);
        }
    }
}

/// An open undo scope. Dropping it without `commit` rolls everything back.
pub struct TransactionScope<'a, H: UndoScope + ?Sized> {
    host: &'a mut H,
    label: String,
    committed: bool,
}

impl<'a, H: UndoScope + ?Sized> TransactionScope<'a, H> {
    pub fn open(host: &'a mut H, label: impl Into<String>) -> Result<Self, HostError> {
        let label = label.into();
        host.open_scope(&label)?;
        tracing::debug!("Opened undo scope '{}'", label);
        Ok(Self {
            host,
            label,
            committed: false,
        })
    }

    pub fn commit(mut self) -> Result<(), HostError> {
        self.host.commit_scope()?;
        self.committed = true;
        tracing::debug!("Committed undo scope '{}'", self.label);
        Ok(())
    }
}

impl<H: UndoScope + ?Sized> Deref for TransactionScope<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: UndoScope + ?Sized> DerefMut for TransactionScope<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: UndoScope + ?Sized> Drop for TransactionScope<'_, H> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        tracing::debug!("Rolling back undo scope '{}'", self.label);
        if let Err(e) = self.host.rollback_scope() {
            tracing::error!("Failed to roll back undo scope '{}': {}", self.label, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::StagnantInterval;
    use crate::host::{InMemoryScene, MarkerSink};
    use crate::markers::MarkerColor;

    fn scene() -> InMemoryScene {
        InMemoryScene::builder().playback_range(1, 10).current_frame(3).build().unwrap()
    }

    #[test]
    fn cursor_is_restored_on_drop() {
        let mut scene = scene();
        {
            let mut guard = CursorGuard::acquire(&mut scene);
            assert_eq!(guard.saved_frame(), 3);
            guard.set_current_frame(8).unwrap();
            assert_eq!(guard.current_frame(), 8);
        }
        assert_eq!(scene.current_frame(), 3);
    }

    #[test]
    fn dropped_scope_rolls_back() {
        let mut scene = scene();
        {
            let mut scope = TransactionScope::open(&mut scene, "test").unwrap();
            scope
                .create_marker(StagnantInterval::new(1, 4), MarkerColor::new(0.5, 0.5, 0.5))
                .unwrap();
            assert_eq!(scope.markers().len(), 1);
        }
        assert!(scene.markers().is_empty());
        assert_eq!(scene.undo_depth(), 0);
    }

    #[test]
    fn committed_scope_keeps_changes() {
        let mut scene = scene();
        let mut scope = TransactionScope::open(&mut scene, "test").unwrap();
        scope
            .create_marker(StagnantInterval::new(1, 4), MarkerColor::new(0.5, 0.5, 0.5))
            .unwrap();
        scope.commit().unwrap();
        assert_eq!(scene.markers().len(), 1);
        assert_eq!(scene.undo_depth(), 1);
    }

    #[test]
    fn nested_scope_is_refused() {
        let mut scene = scene();
        let mut scope = TransactionScope::open(&mut scene, "outer").unwrap();
        let err = TransactionScope::open(&mut *scope, "inner").err();
        assert_eq!(err, Some(HostError::ScopeAlreadyOpen));
    }
}
