//! Moving through the ring: stepping, deleting, and the slideshow tick.
//!
//! Navigation heals itself. A file that fails to decode, or that cannot be
//! held in memory even at true size, is skipped and the step continues in
//! the same direction until something loads or the ring runs out. When it
//! runs out, the record that was active before the step becomes active
//! again.

use super::{Flow, Presenter, Session, SessionError};
use crate::collection::{RecordId, Unlinked};
use crate::imaging::ImageBackend;
use crate::slideshow::Scheduler;

/// Outcome of a navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// A new image is on screen.
    Moved(RecordId),
    /// Nothing (loadable) in that direction.
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl<B: ImageBackend, P: Presenter, S: Scheduler> Session<B, P, S> {
    /// Advance to the next loadable image.
    pub fn next_image(&mut self) -> Result<Navigation, SessionError> {
        self.step(Direction::Forward)
    }

    /// Go back to the previous loadable image.
    pub fn prev_image(&mut self) -> Result<Navigation, SessionError> {
        self.step(Direction::Backward)
    }

    /// Jump to the first loadable image.
    pub fn first_image(&mut self) -> Result<Navigation, SessionError> {
        let origin = self.ring.active();
        self.ring.set_active(None);
        let outcome = self.step(Direction::Forward)?;
        if outcome == Navigation::Exhausted {
            self.ring.set_active(origin);
        }
        Ok(outcome)
    }

    fn step(&mut self, direction: Direction) -> Result<Navigation, SessionError> {
        let origin = self.ring.active();
        loop {
            let stepped = match direction {
                Direction::Forward => self.ring.step_forward(),
                Direction::Backward => self.ring.step_backward(),
            };
            let Some(id) = stepped else {
                self.ring.set_active(origin);
                tracing::debug!(?direction, "no more images");
                return Ok(Navigation::Exhausted);
            };

            match self.load_active() {
                Ok(()) => {
                    if let Some(record) = self.ring.get(id) {
                        tracing::info!(file = %record.file_name(), "showing");
                    }
                    return Ok(Navigation::Moved(id));
                }
                Err(SessionError::Decode { path, source }) => {
                    tracing::warn!(path = %path.display(), error = %source, "skipping image");
                }
                Err(err @ SessionError::Allocation(_)) => {
                    tracing::warn!(%err, "skipping image that does not fit in memory");
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Load and show the active record after it changed underneath the view.
    /// If it will not decode, move on to a neighbour that does. Ends the
    /// session when nothing is left that loads.
    fn reload_active(&mut self) -> Result<Flow, SessionError> {
        match self.load_active() {
            Ok(()) => return Ok(Flow::Continue),
            Err(SessionError::Decode { path, source }) => {
                tracing::warn!(path = %path.display(), error = %source, "skipping image");
            }
            Err(err @ SessionError::Allocation(_)) => {
                tracing::warn!(%err, "skipping image that does not fit in memory");
            }
            Err(err) => return Err(err),
        }

        for direction in [Direction::Forward, Direction::Backward] {
            if let Navigation::Moved(_) = self.step(direction)? {
                return Ok(Flow::Continue);
            }
        }
        tracing::warn!("no loadable images left");
        self.drop_buffer();
        Ok(Flow::Ended)
    }

    /// Delete `id` from disk and from the ring, then show whatever became
    /// active. The file goes first: if it can't be removed, nothing changes.
    pub fn remove(&mut self, id: RecordId) -> Result<Flow, SessionError> {
        let path = self
            .ring
            .get(id)
            .ok_or(SessionError::NoActiveImage)?
            .path()
            .to_path_buf();
        std::fs::remove_file(&path).map_err(|source| SessionError::FileRemoval {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "deleted");

        let Some((record, outcome)) = self.ring.unlink(id) else {
            return Err(SessionError::NoActiveImage);
        };
        self.ring.retire(id, record);
        match outcome {
            Unlinked::Emptied => {
                self.drop_buffer();
                Ok(Flow::Ended)
            }
            Unlinked::Remaining { .. } => self.reload_active(),
        }
    }

    /// Ask, then delete the active image.
    pub fn delete_active(&mut self) -> Result<Flow, SessionError> {
        let record = self
            .ring
            .active_record()
            .ok_or(SessionError::NoActiveImage)?;
        let id = self.ring.active().ok_or(SessionError::NoActiveImage)?;
        let question = format!("Delete file {}?", record.file_name());
        if !self.presenter.prompt_user(&question, "d", "n") {
            return Ok(Flow::Continue);
        }

        match self.remove(id) {
            Err(err @ SessionError::FileRemoval { .. }) => {
                tracing::warn!(%err, "delete failed");
                self.presenter.warn(&err.to_string());
                Err(err)
            }
            other => other,
        }
    }

    /// The slideshow timer went off.
    pub fn on_timer(&mut self) -> Result<Flow, SessionError> {
        if !self.slideshow.fire() {
            return Ok(Flow::Continue);
        }
        self.next_image()?;
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Dimensions;
    use crate::imaging::backend::tests::MockBackend;
    use crate::session::ViewSettings;
    use crate::test_helpers::*;
    use std::time::Duration;

    fn view() -> ViewSettings {
        ViewSettings::default()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    #[test]
    fn advance_cycles_then_reports_end() {
        let mut session = session_with(&[("a.jpg", 8, 8), ("b.jpg", 8, 8), ("c.jpg", 8, 8)], view());
        for expected in ["a.jpg", "b.jpg", "c.jpg"] {
            assert!(matches!(session.next_image().unwrap(), Navigation::Moved(_)));
            assert_eq!(active_file(&session).as_deref(), Some(expected));
        }
        assert_eq!(session.next_image().unwrap(), Navigation::Exhausted);
        assert_eq!(active_file(&session).as_deref(), Some("c.jpg"));
    }

    #[test]
    fn retreat_from_head_fails() {
        let mut session = session_with(&[("a.jpg", 8, 8), ("b.jpg", 8, 8)], view());
        session.next_image().unwrap();
        assert_eq!(session.prev_image().unwrap(), Navigation::Exhausted);
        assert_eq!(active_file(&session).as_deref(), Some("a.jpg"));
    }

    #[test]
    fn first_retreat_lands_on_tail() {
        let mut session = session_with(&[("a.jpg", 8, 8), ("b.jpg", 8, 8)], view());
        session.prev_image().unwrap();
        assert_eq!(active_file(&session).as_deref(), Some("b.jpg"));
    }

    #[test]
    fn undecodable_image_is_skipped() {
        let backend = MockBackend::new()
            .with_image("a.jpg", 8, 8)
            .with_broken("b.jpg")
            .with_image("c.jpg", 8, 8);
        let mut session = session_from(backend, &["a.jpg", "b.jpg", "c.jpg"], view());

        session.next_image().unwrap();
        session.next_image().unwrap();
        assert_eq!(active_file(&session).as_deref(), Some("c.jpg"));
        assert_eq!(session.backend().decode_count("b.jpg"), 1);

        session.prev_image().unwrap();
        assert_eq!(active_file(&session).as_deref(), Some("a.jpg"));
    }

    #[test]
    fn skipping_into_the_end_restores_previous_image() {
        let backend = MockBackend::new()
            .with_image("a.jpg", 8, 8)
            .with_broken("b.jpg");
        let mut session = session_from(backend, &["a.jpg", "b.jpg"], view());
        session.next_image().unwrap();

        assert_eq!(session.next_image().unwrap(), Navigation::Exhausted);
        assert_eq!(active_file(&session).as_deref(), Some("a.jpg"));
        assert!(session.buffer().is_some());
    }

    #[test]
    fn nothing_loadable_leaves_nothing_active() {
        let backend = MockBackend::new().with_broken("a.jpg").with_broken("b.jpg");
        let mut session = session_from(backend, &["a.jpg", "b.jpg"], view());
        assert_eq!(session.next_image().unwrap(), Navigation::Exhausted);
        assert_eq!(session.ring().active(), None);
        assert!(session.buffer().is_none());
    }

    #[test]
    fn home_returns_to_head() {
        let mut session = session_with(&[("a.jpg", 8, 8), ("b.jpg", 8, 8), ("c.jpg", 8, 8)], view());
        session.next_image().unwrap();
        session.next_image().unwrap();
        session.next_image().unwrap();
        session.first_image().unwrap();
        assert_eq!(active_file(&session).as_deref(), Some("a.jpg"));
    }

    #[test]
    fn navigation_shows_each_image_once() {
        let mut session = session_with(&[("a.jpg", 8, 8), ("b.jpg", 16, 8)], view());
        session.next_image().unwrap();
        session.next_image().unwrap();
        let files: Vec<&str> = session
            .presenter()
            .shown
            .iter()
            .map(|frame| frame.file.as_str())
            .collect();
        assert_eq!(files, vec!["a.jpg", "b.jpg"]);
        assert_eq!(session.presenter().shown[1].dims, Dimensions::new(16, 8));
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    #[test]
    fn deleting_the_only_image_ends_session() {
        let fixture = DiskFixture::new(&[("a.jpg", 8, 8)]);
        let mut session = fixture.session(view());
        session.next_image().unwrap();

        let id = session.ring().active().unwrap();
        assert_eq!(session.remove(id).unwrap(), Flow::Ended);
        assert!(session.ring().is_empty());
        assert!(session.buffer().is_none());
        assert!(!fixture.path("a.jpg").exists());
    }

    #[test]
    fn deleting_from_a_pair_leaves_self_linked_survivor() {
        let fixture = DiskFixture::new(&[("a.jpg", 8, 8), ("b.jpg", 12, 6)]);
        let mut session = fixture.session(view());
        session.next_image().unwrap();

        let id = session.ring().active().unwrap();
        assert_eq!(session.remove(id).unwrap(), Flow::Continue);
        let survivor = session.ring().active().unwrap();
        assert_eq!(session.ring().next_of(survivor), Some(survivor));
        assert_eq!(session.ring().prev_of(survivor), Some(survivor));
        assert_eq!(active_file(&session).as_deref(), Some("b.jpg"));
        assert_eq!(session.buffer().unwrap().dimensions(), Dimensions::new(12, 6));
    }

    #[test]
    fn deleting_head_of_four_moves_head() {
        let fixture = DiskFixture::new(&[
            ("a.jpg", 8, 8),
            ("b.jpg", 8, 8),
            ("c.jpg", 8, 8),
            ("d.jpg", 8, 8),
        ]);
        let mut session = fixture.session(view());
        session.next_image().unwrap();

        let head = session.ring().head().unwrap();
        session.remove(head).unwrap();
        assert_eq!(forward_names(session.ring()), vec!["b.jpg", "c.jpg", "d.jpg"]);
        assert_eq!(backward_names(session.ring()), vec!["b.jpg", "d.jpg", "c.jpg"]);
        assert_eq!(active_file(&session).as_deref(), Some("b.jpg"));
        session.ring().check_links().unwrap();
    }

    #[test]
    fn deleting_the_tail_shows_its_predecessor() {
        let fixture = DiskFixture::new(&[("a.jpg", 8, 8), ("b.jpg", 8, 8), ("c.jpg", 8, 8)]);
        let mut session = fixture.session(view());
        session.prev_image().unwrap();
        assert_eq!(active_file(&session).as_deref(), Some("c.jpg"));

        let tail = session.ring().active().unwrap();
        session.remove(tail).unwrap();
        assert_eq!(active_file(&session).as_deref(), Some("b.jpg"));
        assert_eq!(forward_names(session.ring()), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn failed_removal_changes_nothing() {
        let fixture = DiskFixture::new(&[("a.jpg", 8, 8), ("b.jpg", 8, 8)]);
        let mut session = fixture.session(view());
        session.next_image().unwrap();
        std::fs::remove_file(fixture.path("a.jpg")).unwrap();

        let id = session.ring().active().unwrap();
        let err = session.remove(id).unwrap_err();
        assert!(matches!(err, SessionError::FileRemoval { .. }));
        assert_eq!(session.ring().len(), 2);
        assert_eq!(session.ring().active(), Some(id));
        session.ring().check_links().unwrap();
    }

    #[test]
    fn after_deletion_broken_neighbour_is_skipped() {
        let fixture = DiskFixture::new(&[("a.jpg", 8, 8), ("b.jpg", 8, 8), ("c.jpg", 8, 8)])
            .broken("b.jpg");
        let mut session = fixture.session(view());
        session.next_image().unwrap();

        let id = session.ring().active().unwrap();
        assert_eq!(session.remove(id).unwrap(), Flow::Continue);
        assert_eq!(active_file(&session).as_deref(), Some("c.jpg"));
    }

    #[test]
    fn delete_asks_first() {
        let fixture = DiskFixture::new(&[("a.jpg", 8, 8), ("b.jpg", 8, 8)]);
        let mut session = fixture.session(view());
        session.next_image().unwrap();

        session.presenter_mut().answers.push_back(false);
        assert_eq!(session.delete_active().unwrap(), Flow::Continue);
        assert!(fixture.path("a.jpg").exists());

        session.presenter_mut().answers.push_back(true);
        session.delete_active().unwrap();
        assert!(!fixture.path("a.jpg").exists());
        assert_eq!(
            session.presenter().prompts,
            vec!["Delete file a.jpg?".to_string(), "Delete file a.jpg?".to_string()]
        );
    }

    #[test]
    fn deleted_image_keeps_its_notes_for_the_summary() {
        let fixture = DiskFixture::new(&[("a.jpg", 8, 8), ("b.jpg", 8, 8)]);
        let mut session = fixture.session(view());
        session.next_image().unwrap();
        session.toggle_note(2).unwrap();
        session.set_comment("out of focus").unwrap();

        session.presenter_mut().answers.push_back(true);
        session.delete_active().unwrap();
        assert_eq!(session.ring().len(), 1);
        assert_eq!(
            crate::output::format_summary(session.ring()),
            vec!["Note 2: a.jpg", "Comment a.jpg: out of focus"]
        );
    }

    // =========================================================================
    // Slideshow
    // =========================================================================

    #[test]
    fn slideshow_advances_and_stops_at_end() {
        let mut session = session_with(&[("a.jpg", 8, 8), ("b.jpg", 8, 8)], view());
        session.slideshow_mut().set_delay(Duration::from_secs(2));
        session.next_image().unwrap();
        assert!(session.slideshow().is_pending());

        session.slideshow_mut().scheduler_mut().pending = false;
        session.on_timer().unwrap();
        assert_eq!(active_file(&session).as_deref(), Some("b.jpg"));
        // last image: nothing more to schedule
        assert!(!session.slideshow().is_pending());
        assert_eq!(session.slideshow().scheduler().scheduled.len(), 1);
    }

    #[test]
    fn cancelled_timer_does_not_advance() {
        let mut session = session_with(&[("a.jpg", 8, 8), ("b.jpg", 8, 8)], view());
        session.slideshow_mut().set_delay(Duration::from_secs(2));
        session.next_image().unwrap();
        session.set_slideshow_delay(Duration::ZERO);

        session.on_timer().unwrap();
        assert_eq!(active_file(&session).as_deref(), Some("a.jpg"));
    }
}
