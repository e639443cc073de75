//! The viewing session: everything that changes while images are shown.
//!
//! A [`Session`] owns the image ring, the pixel buffer currently on screen,
//! the view settings, and its three collaborators:
//!
//! | Collaborator | Trait | Role |
//! |---|---|---|
//! | backend | [`ImageBackend`] | decode files, read metadata, rescale buffers |
//! | presenter | [`Presenter`] | show buffers, ask yes/no questions, surface warnings |
//! | slideshow | [`Scheduler`] | one-shot timer driving automatic advance |
//!
//! Operations are grouped by concern:
//!
//! - [`transform`]: the scale-and-rotate orchestrator
//! - [`navigate`]: stepping through the ring, deletion, and the slideshow tick
//! - this module: view settings, mode toggles, notes and comments
//!
//! Every operation either commits a fully built new state or leaves the old one
//! in place. The buffer on screen and the geometry recorded for the active
//! image never disagree.

mod navigate;
mod transform;

pub use navigate::Navigation;

use crate::collection::{ImageRecord, ImageRing, RecordId};
use crate::imaging::{
    BackendError, BufferError, Dimensions, ImageBackend, PixelBuffer, PolicyError, ScaleMode,
    ScaleRatio,
};
use crate::slideshow::{Scheduler, Slideshow};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("cannot decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: BackendError,
    },
    #[error("couldn't resize: {0}")]
    Allocation(#[from] BufferError),
    #[error("internal error: {0}")]
    Policy(#[from] PolicyError),
    #[error("cannot delete {}: {source}", path.display())]
    FileRemoval {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("no image is active")]
    NoActiveImage,
}

/// Whether the session goes on after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// No images left, or the user asked to quit.
    Ended,
}

/// How the window sits on the screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisplayMode {
    /// Ordinary decorated window sized to the image.
    #[default]
    Normal,
    /// Undecorated window covering the screen, image centred on black.
    Presentation,
}

/// Settings that shape how every image is shown.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewSettings {
    pub scale_mode: ScaleMode,
    pub scale_ratio: ScaleRatio,
    pub display_mode: DisplayMode,
}

/// The display side of the viewer.
///
/// The session decides *what* to show; the presenter decides how: window
/// placement, title, and how questions are put to the user.
pub trait Presenter {
    /// Size of the monitor the window lives on.
    fn monitor_size(&self) -> Dimensions;

    /// Current inner size of the viewer window.
    fn window_size(&self) -> Dimensions;

    /// A new buffer is ready for `record`.
    fn on_buffer_ready(&mut self, buffer: &PixelBuffer, record: &ImageRecord, view: &ViewSettings);

    /// Ask a yes/no question. Any key in `affirmative` answers yes, any key in
    /// `negative` answers no.
    fn prompt_user(&mut self, message: &str, affirmative: &str, negative: &str) -> bool;

    /// Tell the user something went wrong without interrupting the session.
    fn warn(&mut self, message: &str);

    /// Show details about `record`, the `position`-th of `total` images.
    /// Presenters without an info panel ignore it.
    fn show_info(
        &mut self,
        _record: &ImageRecord,
        _position: usize,
        _total: usize,
        _view: &ViewSettings,
    ) {
    }
}

/// The buffer on screen and the record it belongs to.
#[derive(Debug)]
struct Shown {
    id: RecordId,
    buffer: PixelBuffer,
}

/// One viewing session over a ring of images.
pub struct Session<B, P, S> {
    ring: ImageRing,
    shown: Option<Shown>,
    view: ViewSettings,
    backend: B,
    presenter: P,
    slideshow: Slideshow<S>,
}

impl<B: ImageBackend, P: Presenter, S: Scheduler> Session<B, P, S> {
    pub fn new(
        ring: ImageRing,
        view: ViewSettings,
        backend: B,
        presenter: P,
        slideshow: Slideshow<S>,
    ) -> Self {
        Self {
            ring,
            shown: None,
            view,
            backend,
            presenter,
            slideshow,
        }
    }

    pub fn ring(&self) -> &ImageRing {
        &self.ring
    }

    pub fn view(&self) -> &ViewSettings {
        &self.view
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn slideshow(&self) -> &Slideshow<S> {
        &self.slideshow
    }

    pub fn slideshow_mut(&mut self) -> &mut Slideshow<S> {
        &mut self.slideshow
    }

    /// The buffer on screen, if it belongs to the active record.
    pub fn buffer(&self) -> Option<&PixelBuffer> {
        self.shown
            .as_ref()
            .filter(|shown| Some(shown.id) == self.ring.active())
            .map(|shown| &shown.buffer)
    }

    pub fn active_record(&self) -> Option<&ImageRecord> {
        self.ring.active_record()
    }

    /// Ask the presenter to show details of the active image.
    pub fn show_info(&mut self) -> Result<(), SessionError> {
        let id = self.ring.active().ok_or(SessionError::NoActiveImage)?;
        let record = self.ring.get(id).ok_or(SessionError::NoActiveImage)?;
        let position = self.ring.position(id).unwrap_or_default();
        self.presenter
            .show_info(record, position, self.ring.len(), &self.view);
        Ok(())
    }

    /// Space the scale policy may fill. Fullscreen in presentation mode fills
    /// the window, which can be smaller than a multi-head "monitor".
    fn bounds(&self) -> Dimensions {
        match (self.view.display_mode, self.view.scale_mode) {
            (DisplayMode::Presentation, ScaleMode::Fullscreen) => self.presenter.window_size(),
            _ => self.presenter.monitor_size(),
        }
    }

    fn commit_buffer(&mut self, id: RecordId, buffer: PixelBuffer) {
        self.shown = Some(Shown { id, buffer });
    }

    fn drop_buffer(&mut self) {
        self.shown = None;
    }

    /// Hand the current buffer to the presenter and re-arm the slideshow.
    pub fn show(&mut self) {
        let Some(id) = self.ring.active() else {
            return;
        };
        let (Some(shown), Some(record)) = (self.shown.as_ref(), self.ring.get(id)) else {
            return;
        };
        if shown.id != id {
            return;
        }
        self.presenter
            .on_buffer_ready(&shown.buffer, record, &self.view);
        self.slideshow.arm(self.ring.has_next(id));
    }

    // =========================================================================
    // View settings
    // =========================================================================

    fn set_scale_mode(&mut self, mode: ScaleMode) -> Result<(), SessionError> {
        tracing::debug!(%mode, "scale mode");
        self.view.scale_mode = mode;
        self.rescale()
    }

    /// Re-run the orchestrator with no extra rotation, picking up new settings.
    pub fn rescale(&mut self) -> Result<(), SessionError> {
        if self.ring.active().is_none() {
            return Ok(());
        }
        self.scale_and_rotate(0)
    }

    /// `f`: Fullscreen ↔ Normal.
    pub fn toggle_fullscreen(&mut self) -> Result<(), SessionError> {
        let mode = match self.view.scale_mode {
            ScaleMode::Fullscreen => ScaleMode::Normal,
            _ => ScaleMode::Fullscreen,
        };
        self.set_scale_mode(mode)
    }

    /// `F`: Fullsize ↔ Normal.
    pub fn toggle_fullsize(&mut self) -> Result<(), SessionError> {
        let mode = match self.view.scale_mode {
            ScaleMode::Fullsize => ScaleMode::Normal,
            _ => ScaleMode::Fullsize,
        };
        self.set_scale_mode(mode)
    }

    /// Zooming leaves the fitted modes for their ratio counterparts: screen
    /// ratio for Normal and Fullscreen, image ratio for Fullsize.
    fn zoom(&mut self, ratio: ScaleRatio) -> Result<(), SessionError> {
        self.view.scale_ratio = ratio;
        let mode = match self.view.scale_mode {
            ScaleMode::Normal | ScaleMode::Fullscreen => ScaleMode::ScreenRatio,
            ScaleMode::Fullsize => ScaleMode::ImgRatio,
            other => other,
        };
        tracing::debug!(ratio = ratio.value(), "zoom");
        self.set_scale_mode(mode)
    }

    pub fn zoom_in(&mut self) -> Result<(), SessionError> {
        self.zoom(self.view.scale_ratio.doubled())
    }

    pub fn zoom_out(&mut self) -> Result<(), SessionError> {
        self.zoom(self.view.scale_ratio.halved())
    }

    /// `p`: Normal ↔ Presentation window.
    pub fn toggle_presentation(&mut self) -> Result<(), SessionError> {
        self.view.display_mode = match self.view.display_mode {
            DisplayMode::Presentation => DisplayMode::Normal,
            DisplayMode::Normal => DisplayMode::Presentation,
        };
        tracing::debug!(mode = ?self.view.display_mode, "display mode");
        self.rescale()
    }

    /// Change the slideshow delay. Zero stops the slideshow. Starting one
    /// arms the timer right away from the image on screen.
    pub fn set_slideshow_delay(&mut self, delay: Duration) {
        self.slideshow.set_delay(delay);
        if let Some(id) = self.ring.active() {
            self.slideshow.arm(self.ring.has_next(id));
        }
    }

    // =========================================================================
    // Annotations
    // =========================================================================

    /// Flip the active image's membership in note list `slot`. Returns the
    /// new membership; slots past the last list are never members.
    pub fn toggle_note(&mut self, slot: u8) -> Result<bool, SessionError> {
        let record = self
            .ring
            .active_record_mut()
            .ok_or(SessionError::NoActiveImage)?;
        let member = record.toggle_note(slot).unwrap_or(false);
        tracing::info!(file = %record.file_name(), slot, member, "note");
        Ok(member)
    }

    /// Attach a comment to the active image. An empty comment clears it.
    pub fn set_comment(&mut self, text: &str) -> Result<(), SessionError> {
        let record = self
            .ring
            .active_record_mut()
            .ok_or(SessionError::NoActiveImage)?;
        let text = text.trim();
        record.comment = (!text.is_empty()).then(|| text.to_string());
        Ok(())
    }
}
