//! Image metadata extraction.
//!
//! The viewer reads two things from a file's EXIF block:
//!
//! - **Orientation** (tag `0x0112`): how the camera was held. Only the four
//!   pure rotations are honored; mirrored orientations have no lossless
//!   rotation equivalent and are ignored.
//!
//! - **Date**: `DateTimeOriginal`, falling back to `DateTime`. Shown in the
//!   title bar, never parsed.
//!
//! Both are optional. A file without EXIF, or with EXIF the reader can't make
//! sense of, simply has no metadata.
//!
//! A plain-text sidecar (`photo.txt` next to `photo.jpg`) seeds the image's
//! comment.

use crate::imaging::{ImageMetadata, Rotation};
use exif::{Exif, In, Tag};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Map an EXIF orientation code to the clockwise rotation that displays the
/// image upright.
///
/// | Code | Meaning | Rotation |
/// |---|---|---|
/// | 1 | normal | 0° |
/// | 3 | upside down | 180° |
/// | 6 | rotated 90° CCW | 90° |
/// | 8 | rotated 90° CW | 270° |
/// | 2, 4, 5, 7 | mirrored | none |
pub fn rotation_for_orientation(code: u32) -> Option<Rotation> {
    match code {
        1 => Some(Rotation::Upright),
        3 => Some(Rotation::Cw180),
        6 => Some(Rotation::Cw90),
        8 => Some(Rotation::Cw270),
        _ => None,
    }
}

fn read_exif(path: &Path) -> Option<Exif> {
    let file = File::open(path).ok()?;
    let mut reader = BufReader::new(file);
    exif::Reader::new().read_from_container(&mut reader).ok()
}

fn orientation(exif: &Exif) -> Option<Rotation> {
    let field = exif.get_field(Tag::Orientation, In::PRIMARY)?;
    let code = field.value.get_uint(0)?;
    let rotation = rotation_for_orientation(code);
    if rotation.is_none() {
        tracing::debug!(code, "ignoring mirrored EXIF orientation");
    }
    rotation
}

fn date(exif: &Exif) -> Option<String> {
    [Tag::DateTimeOriginal, Tag::DateTime]
        .into_iter()
        .filter_map(|tag| exif.get_field(tag, In::PRIMARY))
        .map(|field| field.display_value().to_string())
        .map(|s| s.trim().trim_matches('"').to_string())
        .find(|s| !s.is_empty())
}

/// Read orientation, date and sidecar comment. Never fails: unreadable EXIF
/// is no EXIF.
pub fn read_metadata(path: &Path) -> ImageMetadata {
    let (orientation, date) = match read_exif(path) {
        Some(exif) => (
            orientation(&exif).filter(|r| !r.is_upright()),
            self::date(&exif),
        ),
        None => (None, None),
    };
    ImageMetadata {
        orientation,
        date,
        comment: read_sidecar(path),
    }
}

/// Read a sidecar `.txt` file for an image.
///
/// Given `pics/photo.jpg`, returns the trimmed contents of `pics/photo.txt`,
/// or `None` if it doesn't exist or is empty.
pub fn read_sidecar(image_path: &Path) -> Option<String> {
    let sidecar = image_path.with_extension("txt");
    std::fs::read_to_string(sidecar)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn rotations_map_from_exif_codes() {
        assert_eq!(rotation_for_orientation(1), Some(Rotation::Upright));
        assert_eq!(rotation_for_orientation(3), Some(Rotation::Cw180));
        assert_eq!(rotation_for_orientation(6), Some(Rotation::Cw90));
        assert_eq!(rotation_for_orientation(8), Some(Rotation::Cw270));
    }

    #[test]
    fn mirrored_codes_have_no_rotation() {
        for code in [0, 2, 4, 5, 7, 9] {
            assert_eq!(rotation_for_orientation(code), None, "code {code}");
        }
    }

    #[test]
    fn missing_file_has_no_metadata() {
        let meta = read_metadata(Path::new("/nonexistent/photo.jpg"));
        assert_eq!(meta, ImageMetadata::default());
    }

    #[test]
    fn file_without_exif_has_no_metadata() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("plain.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();
        assert_eq!(read_metadata(&path), ImageMetadata::default());
    }

    #[test]
    fn sidecar_is_read_and_trimmed() {
        let tmp = TempDir::new().unwrap();
        let image = tmp.path().join("dawn.jpg");
        std::fs::write(tmp.path().join("dawn.txt"), "  first light \n").unwrap();
        assert_eq!(read_sidecar(&image).as_deref(), Some("first light"));
    }

    #[test]
    fn metadata_picks_up_sidecar_comment() {
        let tmp = TempDir::new().unwrap();
        let image = tmp.path().join("noon.jpg");
        std::fs::write(&image, b"no exif here").unwrap();
        std::fs::write(tmp.path().join("noon.txt"), "harbour\n").unwrap();

        let meta = read_metadata(&image);
        assert_eq!(meta.orientation, None);
        assert_eq!(meta.comment.as_deref(), Some("harbour"));
    }

    #[test]
    fn empty_or_missing_sidecar_is_none() {
        let tmp = TempDir::new().unwrap();
        let image = tmp.path().join("dusk.jpg");
        assert_eq!(read_sidecar(&image), None);
        std::fs::write(tmp.path().join("dusk.txt"), "   \n").unwrap();
        assert_eq!(read_sidecar(&image), None);
    }
}
