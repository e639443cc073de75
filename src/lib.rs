//! # ringview
//!
//! A keyboard-driven image viewer for going through a pile of photos fast:
//! step forward and back, rotate what the camera got wrong, delete the
//! rejects, and jot down which files deserve a second look.
//!
//! # Architecture: Ring, Session, Presenter
//!
//! ```text
//! paths ──collect_images──▶ ImageRing ──▶ Session ──on_buffer_ready──▶ Presenter
//!                                           │  ▲
//!                              ImageBackend ◀┘  └── Command / slideshow tick
//! ```
//!
//! The [`collection::ImageRing`] is the ordered, circular list of files. A
//! [`session::Session`] walks it, keeping exactly one decoded, scaled and
//! rotated [`imaging::PixelBuffer`] on screen. Input arrives as
//! [`commands::Command`]s or slideshow ticks; output goes to whatever
//! implements [`session::Presenter`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`collection`] | Circular ring of image records, argument expansion |
//! | [`imaging`] | Pixel buffers, rotation, scale policy, decoding backends |
//! | [`metadata`] | EXIF orientation and date, sidecar comments |
//! | [`session`] | The view state machine: scale-and-rotate, navigation, deletion |
//! | [`slideshow`] | One-shot timer chain for automatic advance |
//! | [`commands`] | Key vocabulary parsed into commands |
//! | [`config`] | `config.toml` loading, validation, and merging |
//! | [`output`] | Title, info panel, and end-of-session summary text |
//!
//! # Design Decisions
//!
//! ## Always Rescale From What Is On Screen
//!
//! Rotating or rescaling works on the buffer already shown, not the file.
//! Shrinking and rotating a screen-sized buffer is cheap; decoding a
//! twenty-megapixel JPEG again is not. The file is decoded a second time
//! only when the new size is bigger than the buffer and the buffer is
//! smaller than the original, so quality never silently degrades.
//!
//! ## All-Or-Nothing Updates
//!
//! The new buffer and its geometry are built off to the side and swapped in
//! together. If scaling runs out of memory halfway, the previous image stays
//! on screen with the geometry that describes it.
//!
//! ## Arena-Backed Ring
//!
//! Records live in a `Vec` and link to each other by index. Deleting an
//! image just rewires two neighbours; there are no `Rc<RefCell<_>>` cycles,
//! and ids of removed records never come back to life.
//!
//! ## Pluggable Edges
//!
//! Decoding ([`imaging::ImageBackend`]), display ([`session::Presenter`]) and
//! timers ([`slideshow::Scheduler`]) are traits. The binary wires in the
//! `image` crate and a terminal front end; tests wire in recording doubles
//! and never touch a real decoder or clock.

pub mod collection;
pub mod commands;
pub mod config;
pub mod imaging;
pub mod metadata;
pub mod output;
pub mod session;
pub mod slideshow;

#[cfg(test)]
pub(crate) mod test_helpers;
