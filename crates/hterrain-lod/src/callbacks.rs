//! Collaborator hooks: chunk factory, chunk recycler, vertical bounds.
//!
//! The tree never looks inside a chunk. It asks `make` for one when a quadrant
//! becomes visible and hands it back to `recycle` when the quadrant goes away,
//! always with the coordinate the chunk was made for.

use crate::{LodError, QuadCoord};

/// Creates the payload for a quadrant. `None` means "no chunk here".
pub type MakeFn<C> = Box<dyn FnMut(QuadCoord) -> Option<C>>;

/// Releases a payload previously returned by a [`MakeFn`].
pub type RecycleFn<C> = Box<dyn FnMut(C, QuadCoord)>;

/// Reports the terrain height range covered by a quadrant.
pub type VerticalBoundsFn = Box<dyn FnMut(QuadCoord) -> Option<VerticalBounds>>;

/// Height range of the terrain inside one quadrant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VerticalBounds {
    /// Lowest terrain height.
    pub min: f32,
    /// Highest terrain height.
    pub max: f32,
}

impl VerticalBounds {
    /// Construct a range.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Height halfway between `min` and `max`.
    #[must_use]
    pub fn midpoint(&self) -> f32 {
        (self.min + self.max) * 0.5
    }

    /// `true` when both ends are finite. Either order is accepted.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }
}

/// The three optional hooks plus one-shot warning state for the missing ones.
pub(crate) struct LodCallbacks<C> {
    make: Option<MakeFn<C>>,
    recycle: Option<RecycleFn<C>>,
    vertical_bounds: Option<VerticalBoundsFn>,
    warned_make: bool,
    warned_recycle: bool,
}

impl<C> Default for LodCallbacks<C> {
    fn default() -> Self {
        Self {
            make: None,
            recycle: None,
            vertical_bounds: None,
            warned_make: false,
            warned_recycle: false,
        }
    }
}

impl<C> LodCallbacks<C> {
    pub(crate) fn new(
        make: Option<MakeFn<C>>,
        recycle: Option<RecycleFn<C>>,
        vertical_bounds: Option<VerticalBoundsFn>,
    ) -> Self {
        Self {
            make,
            recycle,
            vertical_bounds,
            warned_make: false,
            warned_recycle: false,
        }
    }

    /// Ask the factory for a chunk. Without a factory there is never a chunk.
    pub(crate) fn make_chunk(&mut self, coord: QuadCoord) -> Option<C> {
        match self.make.as_mut() {
            Some(make) => make(coord),
            None => {
                if !self.warned_make {
                    log::warn!("{}", LodError::MissingCallback { name: "make" });
                    self.warned_make = true;
                }
                None
            }
        }
    }

    /// Hand a chunk back. Without a recycler the handle is simply dropped.
    pub(crate) fn recycle_chunk(&mut self, chunk: C, coord: QuadCoord) {
        match self.recycle.as_mut() {
            Some(recycle) => recycle(chunk, coord),
            None => {
                if !self.warned_recycle {
                    log::warn!("{}", LodError::MissingCallback { name: "recycle" });
                    self.warned_recycle = true;
                }
            }
        }
    }

    /// Query the bounds provider. `None` when no provider is configured.
    pub(crate) fn vertical_bounds(
        &mut self,
        coord: QuadCoord,
    ) -> Option<Result<VerticalBounds, LodError>> {
        let provider = self.vertical_bounds.as_mut()?;
        let result = match provider(coord) {
            Some(bounds) if bounds.is_valid() => Ok(bounds),
            Some(bounds) => Err(LodError::MalformedVerticalBounds {
                coord,
                detail: format!("non-finite range [{}, {}]", bounds.min, bounds.max),
            }),
            None => Err(LodError::MalformedVerticalBounds {
                coord,
                detail: "provider returned no range".to_string(),
            }),
        };
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_midpoint() {
        assert_eq!(VerticalBounds::new(-10.0, 30.0).midpoint(), 10.0);
    }

    #[test]
    fn test_bounds_validity() {
        assert!(VerticalBounds::new(0.0, 0.0).is_valid());
        assert!(VerticalBounds::new(5.0, 1.0).is_valid());
        assert!(!VerticalBounds::new(f32::NAN, 1.0).is_valid());
        assert!(!VerticalBounds::new(0.0, f32::INFINITY).is_valid());
    }

    #[test]
    fn test_unconfigured_callbacks_are_inert() {
        let mut callbacks = LodCallbacks::<u32>::default();
        assert_eq!(callbacks.make_chunk(QuadCoord::root(0)), None);
        callbacks.recycle_chunk(7, QuadCoord::root(0));
        assert!(callbacks.vertical_bounds(QuadCoord::root(0)).is_none());
    }

    #[test]
    fn test_malformed_bounds_reported() {
        let mut callbacks = LodCallbacks::<u32>::new(
            None,
            None,
            Some(Box::new(|coord: QuadCoord| {
                (coord.lod > 0).then(|| VerticalBounds::new(f32::NAN, 3.0))
            })),
        );
        let non_finite = callbacks.vertical_bounds(QuadCoord::new(0, 0, 1));
        assert!(matches!(
            non_finite,
            Some(Err(LodError::MalformedVerticalBounds { .. }))
        ));
        let missing = callbacks.vertical_bounds(QuadCoord::new(0, 0, 0));
        assert!(matches!(
            missing,
            Some(Err(LodError::MalformedVerticalBounds { .. }))
        ));
    }

    #[test]
    fn test_inverted_bounds_keep_their_midpoint() {
        let mut callbacks = LodCallbacks::<u32>::new(
            None,
            None,
            Some(Box::new(|_: QuadCoord| Some(VerticalBounds::new(1100.0, 900.0)))),
        );
        let bounds = callbacks.vertical_bounds(QuadCoord::root(1)).unwrap().unwrap();
        assert_eq!(bounds.midpoint(), 1000.0);
    }

    #[test]
    fn test_valid_bounds_pass_through() {
        let mut callbacks = LodCallbacks::<u32>::new(
            None,
            None,
            Some(Box::new(|_: QuadCoord| Some(VerticalBounds::new(1.0, 2.0)))),
        );
        assert_eq!(
            callbacks.vertical_bounds(QuadCoord::root(3)),
            Some(Ok(VerticalBounds::new(1.0, 2.0)))
        );
    }
}
