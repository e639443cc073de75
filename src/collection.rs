//! The ring of image records the viewer walks through.
//!
//! Records live in an arena and refer to each other by [`RecordId`], so the
//! circular `next`/`prev` structure is plain index bookkeeping that tests can
//! inspect directly. A removed record's slot stays empty forever; ids are never
//! reused, which means a stale id can only ever miss, not alias.
//!
//! ```text
//!   head                          tail
//!    ┌──▶ a.jpg ──▶ b.jpg ──▶ c.jpg ──┐
//!    └────────────────────────────────┘   (prev links run the other way)
//! ```
//!
//! Two pointers ride on the ring: the **head** (first record in traversal
//! order, used to detect wraparound) and the **active** record (the one on
//! screen). Stepping forward stops when the next record would be the head
//! again; stepping backward stops at the head.

use crate::imaging::{Dimensions, Rotation, is_supported_image};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Stable handle of a record in an [`ImageRing`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(usize);

impl RecordId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Size and orientation of a record's image.
///
/// `true_dims` is always the as-decoded size, before any rotation. `current`
/// is the size of the buffer on screen, after scaling and rotation.
/// `rotation` is the turn baked into that buffer relative to the decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Geometry {
    pub true_dims: Dimensions,
    pub current: Dimensions,
    pub rotation: Rotation,
}

impl Geometry {
    /// Geometry of a freshly decoded, unscaled, unrotated buffer.
    pub fn decoded(dims: Dimensions) -> Self {
        Self {
            true_dims: dims,
            current: dims,
            rotation: Rotation::Upright,
        }
    }

    pub fn is_decoded(&self) -> bool {
        !self.true_dims.is_empty()
    }
}

/// Number of note lists an image can be filed under (keys `0`–`9`).
pub const NOTE_SLOTS: u8 = 10;

/// One source file and everything the viewer remembers about it.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRecord {
    path: PathBuf,
    pub geometry: Geometry,
    /// Orientation from EXIF, captured on first decode.
    pub exif_rotation: Rotation,
    pub date: Option<String>,
    pub comment: Option<String>,
    notes: u16,
}

impl ImageRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            geometry: Geometry::default(),
            exif_rotation: Rotation::Upright,
            date: None,
            comment: None,
            notes: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component, for titles and summaries.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Flip membership in note list `slot`. Returns the new membership, or
    /// `None` for a slot outside `0..NOTE_SLOTS`.
    pub fn toggle_note(&mut self, slot: u8) -> Option<bool> {
        if slot >= NOTE_SLOTS {
            return None;
        }
        self.notes ^= 1 << slot;
        Some(self.has_note(slot))
    }

    pub fn has_note(&self, slot: u8) -> bool {
        slot < NOTE_SLOTS && self.notes & (1 << slot) != 0
    }

    pub fn notes(&self) -> impl Iterator<Item = u8> + '_ {
        (0..NOTE_SLOTS).filter(|&slot| self.has_note(slot))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Links {
    next: RecordId,
    prev: RecordId,
}

/// What remains after [`ImageRing::unlink`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unlinked {
    /// The removed record was the last one.
    Emptied,
    /// The ring still has records; `active` now points at this neighbour.
    Remaining { active: RecordId },
}

/// Circular doubly-linked collection of [`ImageRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct ImageRing {
    records: Vec<Option<ImageRecord>>,
    links: Vec<Links>,
    head: Option<RecordId>,
    active: Option<RecordId>,
    len: usize,
    /// Records deleted during the session, kept for the exit summary.
    retired: Vec<(RecordId, ImageRecord)>,
}

impl ImageRing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut ring = Self::new();
        for path in paths {
            ring.push(ImageRecord::new(path));
        }
        ring
    }

    /// Append a record at the tail (just before the head).
    pub fn push(&mut self, record: ImageRecord) -> RecordId {
        let id = RecordId(self.records.len());
        self.records.push(Some(record));
        match self.head {
            None => {
                self.links.push(Links { next: id, prev: id });
                self.head = Some(id);
            }
            Some(head) => {
                let tail = self.links[head.0].prev;
                self.links.push(Links {
                    next: head,
                    prev: tail,
                });
                self.links[tail.0].next = id;
                self.links[head.0].prev = id;
            }
        }
        self.len += 1;
        id
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn head(&self) -> Option<RecordId> {
        self.head
    }

    pub fn active(&self) -> Option<RecordId> {
        self.active
    }

    /// Point the active marker somewhere else. A removed id clears it.
    pub fn set_active(&mut self, id: Option<RecordId>) {
        self.active = id.filter(|&id| self.contains(id));
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.records.get(id.0).is_some_and(Option::is_some)
    }

    pub fn get(&self, id: RecordId) -> Option<&ImageRecord> {
        self.records.get(id.0)?.as_ref()
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut ImageRecord> {
        self.records.get_mut(id.0)?.as_mut()
    }

    pub fn active_record(&self) -> Option<&ImageRecord> {
        self.get(self.active?)
    }

    pub fn active_record_mut(&mut self) -> Option<&mut ImageRecord> {
        let id = self.active?;
        self.get_mut(id)
    }

    pub fn next_of(&self, id: RecordId) -> Option<RecordId> {
        self.contains(id).then(|| self.links[id.0].next)
    }

    pub fn prev_of(&self, id: RecordId) -> Option<RecordId> {
        self.contains(id).then(|| self.links[id.0].prev)
    }

    /// `true` if stepping forward from `id` would reach another record
    /// before wrapping around to the head.
    pub fn has_next(&self, id: RecordId) -> bool {
        self.next_of(id).is_some_and(|next| Some(next) != self.head)
    }

    /// 1-based position of `id` in traversal order.
    pub fn position(&self, id: RecordId) -> Option<usize> {
        self.ids().position(|candidate| candidate == id).map(|i| i + 1)
    }

    /// Move the active marker one record forward.
    ///
    /// With nothing active yet this lands on the head. Returns `None`, leaving
    /// the marker where it was, once the next record would be the head again.
    pub fn step_forward(&mut self) -> Option<RecordId> {
        let target = match self.active {
            None => self.head?,
            Some(current) => {
                let next = self.next_of(current)?;
                if Some(next) == self.head {
                    return None;
                }
                next
            }
        };
        self.active = Some(target);
        Some(target)
    }

    /// Move the active marker one record back.
    ///
    /// With nothing active yet this lands on the tail. Returns `None` when the
    /// active record already is the head.
    pub fn step_backward(&mut self) -> Option<RecordId> {
        let target = match self.active {
            None => self.prev_of(self.head?)?,
            Some(current) if Some(current) == self.head => return None,
            Some(current) => self.prev_of(current)?,
        };
        self.active = Some(target);
        Some(target)
    }

    /// Detach `id` from the ring and hand its record back.
    ///
    /// Afterwards the active marker points at a live neighbour (the one that
    /// followed the removed record, or the one before it when the removed
    /// record was the tail), and the head moves on if it was removed.
    /// Returns `None` for an id that is not in the ring.
    pub fn unlink(&mut self, id: RecordId) -> Option<(ImageRecord, Unlinked)> {
        let head = self.head?;
        let record = self.records.get_mut(id.0)?.take()?;
        let Links { next, prev } = self.links[id.0];
        self.len -= 1;

        if next == id {
            // sole record
            self.head = None;
            self.active = None;
            return Some((record, Unlinked::Emptied));
        }

        let outcome = if prev == next {
            // two records: the survivor links to itself
            self.links[prev.0] = Links { next: prev, prev };
            self.head = Some(prev);
            prev
        } else if next == head {
            // removing the tail: step back, keep the head
            self.links[prev.0].next = head;
            self.links[head.0].prev = prev;
            prev
        } else {
            self.links[prev.0].next = next;
            self.links[next.0].prev = prev;
            next
        };

        if id == head {
            self.head = Some(next);
        }
        self.active = Some(outcome);
        Some((record, Unlinked::Remaining { active: outcome }))
    }

    /// Hold on to a record taken out by [`unlink`](Self::unlink) so
    /// [`history`](Self::history) still lists it.
    pub fn retire(&mut self, id: RecordId, record: ImageRecord) {
        self.retired.push((id, record));
    }

    /// Live and retired records together, in the order they were added.
    pub fn history(&self) -> impl Iterator<Item = &ImageRecord> + '_ {
        let mut all: Vec<(RecordId, &ImageRecord)> = self
            .iter()
            .chain(self.retired.iter().map(|(id, record)| (*id, record)))
            .collect();
        all.sort_by_key(|(id, _)| *id);
        all.into_iter().map(|(_, record)| record)
    }

    /// Record ids in forward order, starting at the head.
    pub fn ids(&self) -> impl Iterator<Item = RecordId> + '_ {
        let mut cursor = self.head;
        let mut remaining = self.len;
        std::iter::from_fn(move || {
            if remaining == 0 {
                return None;
            }
            let id = cursor?;
            remaining -= 1;
            cursor = Some(self.links[id.0].next);
            Some(id)
        })
    }

    /// Records in forward order, starting at the head.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &ImageRecord)> + '_ {
        self.ids().filter_map(|id| self.get(id).map(|record| (id, record)))
    }

    /// Verify the link structure: every live record is reachable both ways
    /// from the head in exactly `len` steps, and `next`/`prev` mirror each other.
    pub fn check_links(&self) -> Result<(), String> {
        let Some(head) = self.head else {
            return if self.len == 0 && self.active.is_none() {
                Ok(())
            } else {
                Err(format!("no head but len {} / active {:?}", self.len, self.active))
            };
        };

        let mut forward = head;
        let mut backward = head;
        for step in 0..self.len {
            if !self.contains(forward) || !self.contains(backward) {
                return Err(format!("dead record reached at step {step}"));
            }
            let Links { next, prev } = self.links[forward.0];
            if self.links[next.0].prev != forward || self.links[prev.0].next != forward {
                return Err(format!("links of {forward:?} are not mirrored"));
            }
            forward = next;
            backward = self.links[backward.0].prev;
        }
        if forward != head || backward != head {
            return Err(format!("ring does not close after {} records", self.len));
        }
        let live = self.records.iter().filter(|r| r.is_some()).count();
        if live != self.len {
            return Err(format!("{live} live records but len {}", self.len));
        }
        if let Some(active) = self.active {
            if !self.contains(active) {
                return Err(format!("active {active:?} was removed"));
            }
        }
        Ok(())
    }
}

/// Expand command-line arguments into image paths, in argument order.
///
/// Files are taken as given, whatever their extension; the decoder decides
/// later whether they are images. A directory contributes its own supported
/// image files, sorted by name. Subdirectories are not descended into.
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();
    for path in paths {
        if !path.is_dir() {
            images.push(path.clone());
            continue;
        }
        for entry in WalkDir::new(path)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            if is_supported_image(entry.path()) {
                images.push(entry.into_path());
            }
        }
    }
    images
}
