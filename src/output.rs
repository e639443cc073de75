//! Text the viewer shows: title bar, info panel, end-of-session summary.
//!
//! # Output Format
//!
//! ## Title
//!
//! ```text
//! dawn.jpg (1024 x 512) (2021:06:01 06:12:00) (fullscreen)
//! ```
//!
//! Size is the displayed size. The date appears when the file carries one,
//! `(fullscreen)` when that scale mode is on.
//!
//! ## Info
//!
//! ```text
//! dawn.jpg (2 of 5)
//!     Size: 2000 x 1000
//!     Shown: 1024 x 512 (fullscreen)
//!     Rotation: 90°
//!     Camera rotation: 90°
//!     Date: 2021:06:01 06:12:00
//!     Comment: first light
//!     Notes: 1 3
//! ```
//!
//! ## Session summary
//!
//! ```text
//! Note 1: dawn.jpg dusk.jpg
//! Note 3: dawn.jpg
//! Comment dawn.jpg: first light
//! ```
//!
//! # Architecture
//!
//! Each display has a `format_*` function (returns `String` or `Vec<String>`)
//! for testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure and do no I/O.

use crate::collection::{ImageRecord, ImageRing, NOTE_SLOTS};
use crate::imaging::{Dimensions, ScaleMode};
use crate::session::ViewSettings;

fn size(dims: Dimensions) -> String {
    format!("{} x {}", dims.width, dims.height)
}

/// Window title for `record` as currently shown.
pub fn format_title(record: &ImageRecord, view: &ViewSettings) -> String {
    let mut title = format!(
        "{} ({})",
        record.file_name(),
        size(record.geometry.current)
    );
    if let Some(date) = &record.date {
        title.push_str(&format!(" ({date})"));
    }
    if view.scale_mode == ScaleMode::Fullscreen {
        title.push_str(" (fullscreen)");
    }
    title
}

/// Info panel lines for `record`, `position` of `total`.
pub fn format_info(
    record: &ImageRecord,
    position: usize,
    total: usize,
    view: &ViewSettings,
) -> Vec<String> {
    let geometry = &record.geometry;
    let mut lines = vec![format!("{} ({position} of {total})", record.file_name())];
    lines.push(format!("    Size: {}", size(geometry.true_dims)));

    let mode = match view.scale_mode {
        ScaleMode::ImgRatio | ScaleMode::ScreenRatio => {
            format!("{} x{}", view.scale_mode, view.scale_ratio.value())
        }
        mode => mode.to_string(),
    };
    lines.push(format!("    Shown: {} ({mode})", size(geometry.current)));
    lines.push(format!("    Rotation: {}", geometry.rotation));
    if !record.exif_rotation.is_upright() {
        lines.push(format!("    Camera rotation: {}", record.exif_rotation));
    }
    if let Some(date) = &record.date {
        lines.push(format!("    Date: {date}"));
    }
    if let Some(comment) = &record.comment {
        lines.push(format!("    Comment: {comment}"));
    }
    let notes: Vec<String> = record.notes().map(|slot| slot.to_string()).collect();
    if !notes.is_empty() {
        lines.push(format!("    Notes: {}", notes.join(" ")));
    }
    lines
}

/// Non-empty note lists, then comments, in the order the files were given.
/// Files deleted during the session are still listed.
pub fn format_summary(ring: &ImageRing) -> Vec<String> {
    let mut lines: Vec<String> = (0..NOTE_SLOTS)
        .filter_map(|slot| {
            let files: Vec<String> = ring
                .history()
                .filter(|record| record.has_note(slot))
                .map(ImageRecord::file_name)
                .collect();
            (!files.is_empty()).then(|| format!("Note {slot}: {}", files.join(" ")))
        })
        .collect();

    lines.extend(ring.history().filter_map(|record| {
        record
            .comment
            .as_ref()
            .map(|comment| format!("Comment {}: {comment}", record.file_name()))
    }));
    lines
}

/// Print the info panel to stdout.
pub fn print_info(record: &ImageRecord, position: usize, total: usize, view: &ViewSettings) {
    for line in format_info(record, position, total, view) {
        println!("{}", line);
    }
}

/// Print the end-of-session summary to stdout.
pub fn print_summary(ring: &ImageRing) {
    for line in format_summary(ring) {
        println!("{}", line);
    }
}
