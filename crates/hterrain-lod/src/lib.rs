//! Distance-driven level-of-detail quadtree for square heightmap terrain.
//!
//! The terrain is split into quadrants. Near the viewer quadrants are
//! subdivided down to LOD 0 (`base_size` world units wide); far away they are
//! merged back up to the root. Every visible leaf owns at most one chunk,
//! obtained from and returned to user callbacks.

mod callbacks;
mod coord;
mod debug_draw;
mod error;
mod quad;
mod tree;

pub use callbacks::{MakeFn, RecycleFn, VerticalBounds, VerticalBoundsFn};
pub use coord::{MAX_LOD, QuadCoord, compute_lod_count, lod_factor};
pub use debug_draw::{DebugColor, DebugRect, DrawTarget, leaf_color};
pub use error::LodError;
pub use quad::QuadNode;
pub use tree::{MAX_SPLIT_SCALE, MIN_SPLIT_SCALE, QuadTreeLod, UpdateStats};
