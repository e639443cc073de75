//! Scale-and-rotate orchestration.
//!
//! [`Session::scale_and_rotate`] turns the active image by a relative angle
//! and resizes it to whatever the scale policy asks for. It does the least
//! pixel work it can:
//!
//! - When enlarging, the buffer is rotated first, while it is still small.
//! - When shrinking, it is scaled first and the smaller result is rotated.
//! - A buffer that was shrunk earlier is never blown up again. If the target
//!   is bigger than what is on screen and the screen copy is below true
//!   resolution, the file is decoded again and the whole rotation is
//!   reapplied to the fresh copy.
//!
//! All pixel work happens on buffers the session does not own yet
//! ([`stage`]). Only when every step has succeeded are the new buffer and
//! geometry committed together, so a failed allocation leaves the previous
//! image and its geometry on screen untouched.

use super::{Presenter, Session, SessionError};
use crate::collection::{Geometry, RecordId};
use crate::imaging::{
    BackendError, Dimensions, ImageBackend, PixelBuffer, PolicyError, Rotation, ScaleMode,
    ScaleRatio, ScaleRequest, resolve_target, rotate,
};
use crate::slideshow::Scheduler;
use std::path::Path;

/// Inputs to one orchestration step.
#[derive(Debug, Clone, Copy)]
struct Plan<'a> {
    path: &'a Path,
    geometry: Geometry,
    delta: Rotation,
    bounds: Dimensions,
    mode: ScaleMode,
    ratio: ScaleRatio,
}

/// Result of a step that has not been committed yet.
#[derive(Debug)]
struct Staged {
    /// Replacement buffer; `None` when the shown buffer already fits.
    buffer: Option<PixelBuffer>,
    geometry: Geometry,
    /// Policy failure that degraded the step to "keep the current size".
    diagnostic: Option<PolicyError>,
}

fn scale_error(path: &Path, err: BackendError) -> SessionError {
    match err {
        BackendError::Buffer(err) => SessionError::Allocation(err),
        source => SessionError::Decode {
            path: path.to_path_buf(),
            source,
        },
    }
}

/// Work out and perform the pixel operations for `plan`, starting from
/// `shown`. Nothing outside the returned [`Staged`] is modified.
fn stage<B: ImageBackend>(
    backend: &B,
    shown: &PixelBuffer,
    plan: &Plan<'_>,
) -> Result<Staged, SessionError> {
    let mut geometry = plan.geometry;
    let mut pending = plan.delta;

    // reason in the orientation the image will end up in
    let true_oriented = geometry.true_dims.oriented(geometry.rotation + pending);
    let mut current = geometry.current.oriented(pending);

    let request = ScaleRequest {
        true_dims: true_oriented,
        current,
        bounds: plan.bounds,
        mode: plan.mode,
        ratio: plan.ratio,
    };
    let (target, diagnostic) = match resolve_target(&request) {
        Ok(target) => (target, None),
        Err(err) => (current, Some(err)),
    };

    let mut fresh: Option<PixelBuffer> = None;
    if target.exceeds(current) && current.smaller_than(true_oriented) {
        tracing::debug!(
            from = %current,
            to = %target,
            "enlarging a reduced copy: reloading at full resolution"
        );
        pending = geometry.rotation + pending;
        let reloaded = backend
            .decode(plan.path)
            .map_err(|source| SessionError::Decode {
                path: plan.path.to_path_buf(),
                source,
            })?;
        geometry = Geometry::decoded(reloaded.dimensions());
        current = geometry.current.oriented(pending);
        fresh = Some(reloaded);
    }

    let unrotated_target;
    if !pending.is_upright() && target.exceeds(current) {
        let source = fresh.as_ref().unwrap_or(shown);
        let turned = rotate(source, pending)?.into_owned();
        tracing::debug!(rotation = %pending, dims = %turned.dimensions(), "rotated before scaling");
        geometry.current = turned.dimensions();
        geometry.rotation = geometry.rotation + pending;
        pending = Rotation::Upright;
        fresh = Some(turned);
        unrotated_target = target;
    } else if pending.swaps_axes() {
        unrotated_target = target.swapped();
    } else {
        unrotated_target = target;
    }

    if unrotated_target != geometry.current {
        let source = fresh.as_ref().unwrap_or(shown);
        let scaled = backend
            .scale(source, unrotated_target)
            .map_err(|err| scale_error(plan.path, err))?;
        tracing::debug!(from = %geometry.current, to = %scaled.dimensions(), "scaled");
        geometry.current = scaled.dimensions();
        fresh = Some(scaled);
    }

    if !pending.is_upright() {
        let source = fresh.as_ref().unwrap_or(shown);
        let turned = rotate(source, pending)?.into_owned();
        tracing::debug!(rotation = %pending, dims = %turned.dimensions(), "rotated after scaling");
        geometry.current = turned.dimensions();
        geometry.rotation = geometry.rotation + pending;
        fresh = Some(turned);
    }

    Ok(Staged {
        buffer: fresh,
        geometry,
        diagnostic,
    })
}

impl<B: ImageBackend, P: Presenter, S: Scheduler> Session<B, P, S> {
    /// Turn the active image by `delta_degrees` (relative to its current
    /// rotation, negative turns counter-clockwise) and size it for the
    /// current scale mode, then hand it to the presenter.
    ///
    /// Restores the image first if it is not in memory. On an allocation
    /// failure the previous buffer stays on screen and the user is warned.
    pub fn scale_and_rotate(&mut self, delta_degrees: i32) -> Result<(), SessionError> {
        let Some(delta) = Rotation::from_degrees(delta_degrees) else {
            let err = PolicyError::Angle(delta_degrees);
            tracing::error!(%err, "rejected rotation");
            self.presenter.warn(&format!("Internal error: {err}"));
            return Err(err.into());
        };
        let id = self.ring.active().ok_or(SessionError::NoActiveImage)?;
        if self.buffer().is_none() || !self.record_geometry(id)?.is_decoded() {
            self.restore(id)?;
        }

        let bounds = self.bounds();
        let record = self.ring.get(id).ok_or(SessionError::NoActiveImage)?;
        let shown = self.buffer().ok_or(SessionError::NoActiveImage)?;
        let plan = Plan {
            path: record.path(),
            geometry: record.geometry,
            delta,
            bounds,
            mode: self.view.scale_mode,
            ratio: self.view.scale_ratio,
        };

        let staged = match stage(&self.backend, shown, &plan) {
            Ok(staged) => staged,
            Err(err @ SessionError::Allocation(_)) => {
                self.report_allocation(id, &err);
                return Err(err);
            }
            Err(err) => return Err(err),
        };
        self.commit_staged(id, staged, None);
        self.show();
        Ok(())
    }

    fn record_geometry(&self, id: RecordId) -> Result<Geometry, SessionError> {
        self.ring
            .get(id)
            .map(|record| record.geometry)
            .ok_or(SessionError::NoActiveImage)
    }

    fn report_allocation(&mut self, id: RecordId, err: &SessionError) {
        let file = self.ring.get(id).map(|record| record.file_name()).unwrap_or_default();
        tracing::warn!(%file, %err, "scaling failed, keeping previous size");
        self.presenter
            .warn("Couldn't scale up: probably out of memory");
    }

    /// Swap in a staged result. `base` is the buffer the stage started from,
    /// used when the stage itself produced nothing new.
    fn commit_staged(&mut self, id: RecordId, staged: Staged, base: Option<PixelBuffer>) {
        if let Some(err) = &staged.diagnostic {
            tracing::error!(%err, mode = %self.view.scale_mode, "scale policy failed, keeping current size");
            self.presenter.warn(&format!("Internal error: {err}"));
        }
        if let Some(buffer) = staged.buffer.or(base) {
            self.commit_buffer(id, buffer);
        }
        if let Some(record) = self.ring.get_mut(id) {
            record.geometry = staged.geometry;
        }
    }

    /// Decode record `id` at full resolution without touching its geometry
    /// or the shown buffer.
    ///
    /// The first decode of a record also captures its metadata: orientation
    /// hint, date, and a sidecar comment unless the user already set one.
    fn decode_fresh(&mut self, id: RecordId) -> Result<PixelBuffer, SessionError> {
        let record = self.ring.get(id).ok_or(SessionError::NoActiveImage)?;
        let path = record.path().to_path_buf();
        let first_time = !record.geometry.is_decoded();

        let buffer = self
            .backend
            .decode(&path)
            .map_err(|source| SessionError::Decode {
                path: path.clone(),
                source,
            })?;
        tracing::debug!(path = %path.display(), dims = %buffer.dimensions(), first_time, "decoded");
        if !first_time {
            return Ok(buffer);
        }

        let metadata = self.backend.read_metadata(&path).unwrap_or_else(|err| {
            tracing::debug!(path = %path.display(), %err, "no metadata");
            Default::default()
        });
        let record = self.ring.get_mut(id).ok_or(SessionError::NoActiveImage)?;
        record.exif_rotation = metadata.orientation.unwrap_or_default();
        record.date = metadata.date;
        if record.comment.is_none() {
            record.comment = metadata.comment;
        }
        Ok(buffer)
    }

    /// Decode record `id` and bring it to the rotation it should have: its
    /// metadata orientation the first time, afterwards whatever rotation it
    /// had when it was last shown. Then size it for the current scale mode.
    ///
    /// When sizing runs out of memory the image is kept at true size, still
    /// rotated. If even the rotation fails, nothing is committed and the
    /// record keeps the geometry it had.
    fn restore(&mut self, id: RecordId) -> Result<(), SessionError> {
        let before = self.record_geometry(id)?;
        let decoded = self.decode_fresh(id)?;

        let bounds = self.bounds();
        let record = self.ring.get(id).ok_or(SessionError::NoActiveImage)?;
        let owed = if before.is_decoded() {
            before.rotation
        } else {
            record.exif_rotation
        };
        let plan = Plan {
            path: record.path(),
            geometry: Geometry::decoded(decoded.dimensions()),
            delta: owed,
            bounds,
            mode: self.view.scale_mode,
            ratio: self.view.scale_ratio,
        };

        match stage(&self.backend, &decoded, &plan) {
            Ok(staged) => {
                self.commit_staged(id, staged, Some(decoded));
                Ok(())
            }
            Err(err @ SessionError::Allocation(_)) => {
                self.report_allocation(id, &err);
                let true_dims = decoded.dimensions();
                let buffer = if owed.is_upright() {
                    decoded
                } else {
                    rotate(&decoded, owed)?.into_owned()
                };
                let geometry = Geometry {
                    true_dims,
                    current: buffer.dimensions(),
                    rotation: owed,
                };
                self.commit_buffer(id, buffer);
                if let Some(record) = self.ring.get_mut(id) {
                    record.geometry = geometry;
                }
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Restore the active record and show it.
    pub(super) fn load_active(&mut self) -> Result<(), SessionError> {
        let id = self.ring.active().ok_or(SessionError::NoActiveImage)?;
        self.restore(id)?;
        self.show();
        Ok(())
    }
}
