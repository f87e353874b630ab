//! Errors reported while maintaining the LOD tree.
//!
//! None of these abort an update. They are logged and the traversal carries
//! on with a safe default; the next update recomputes from scratch.

use crate::QuadCoord;

/// Problems detected by the quadtree or its collaborators.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LodError {
    /// The vertical bounds provider returned nothing or an unusable range.
    #[error("vertical bounds for {coord} are malformed: {detail}")]
    MalformedVerticalBounds {
        /// Quadrant that was queried.
        coord: QuadCoord,
        /// What was wrong with the result.
        detail: String,
    },

    /// A split was requested on a quadrant that already has children.
    #[error("quadrant {coord} already has children")]
    AlreadySubdivided {
        /// Quadrant that was asked to split.
        coord: QuadCoord,
    },

    /// A split was requested below the base LOD.
    #[error("quadrant {coord} is at the base LOD and cannot split")]
    BelowBaseLod {
        /// Quadrant that was asked to split.
        coord: QuadCoord,
    },

    /// A chunk callback was needed but never configured.
    #[error("no {name} callback configured")]
    MissingCallback {
        /// Name of the missing callback (`"make"` or `"recycle"`).
        name: &'static str,
    },
}
