//! Quadrant addressing and LOD arithmetic.

/// Deepest LOD the tree will build. Keeps `2^lod` representable in a `u32`.
pub const MAX_LOD: u32 = 31;

/// Identifies one quadrant of the tree.
///
/// - `lod`: depth of the quadrant. LOD 0 is the base resolution (smallest
///   chunks), higher values are coarser.
/// - `x`, `y`: grid coordinates at this quadrant's own LOD, not at LOD 0.
///   The world footprint is `base_size * 2^lod` wide, anchored at
///   `(x * size, y * size)` on the XZ plane.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuadCoord {
    /// Horizontal grid coordinate at this LOD (world X axis).
    pub x: u32,
    /// Vertical grid coordinate at this LOD (world Z axis).
    pub y: u32,
    /// Level of detail (0 = finest).
    pub lod: u32,
}

impl QuadCoord {
    /// Construct a coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32, lod: u32) -> Self {
        Self { x, y, lod }
    }

    /// The root quadrant of a tree whose coarsest level is `max_depth`.
    #[must_use]
    pub const fn root(max_depth: u32) -> Self {
        Self::new(0, 0, max_depth)
    }

    /// Child quadrant for `index` in `0..4`.
    ///
    /// Bit 0 of the index is the X offset, bit 1 the Y offset. Returns `None`
    /// at LOD 0 or for an index outside `0..4`.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<Self> {
        if self.lod == 0 || index >= 4 {
            return None;
        }
        Some(Self {
            x: self.x * 2 + (index & 1) as u32,
            y: self.y * 2 + ((index >> 1) & 1) as u32,
            lod: self.lod - 1,
        })
    }

    /// The four child quadrants, ordered by [`Self::sibling_index`].
    ///
    /// Returns `None` at LOD 0.
    #[must_use]
    pub fn children(&self) -> Option<[Self; 4]> {
        if self.lod == 0 {
            return None;
        }
        let child_lod = self.lod - 1;
        let cx = self.x * 2;
        let cy = self.y * 2;
        Some([
            Self::new(cx, cy, child_lod),
            Self::new(cx + 1, cy, child_lod),
            Self::new(cx, cy + 1, child_lod),
            Self::new(cx + 1, cy + 1, child_lod),
        ])
    }

    /// Position of this quadrant among its siblings (`0..4`).
    #[must_use]
    pub fn sibling_index(&self) -> usize {
        ((self.x & 1) | ((self.y & 1) << 1)) as usize
    }
}

impl std::fmt::Display for QuadCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(lod={}, x={}, y={})", self.lod, self.x, self.y)
    }
}

/// Number of times `full_size` must be halved until it is no larger than
/// `base_size`, i.e. the number of LOD levels above the base.
#[must_use]
pub fn compute_lod_count(base_size: u32, full_size: u32) -> u32 {
    let mut size = full_size;
    let mut count = 0;
    while size > base_size {
        size >>= 1;
        count += 1;
    }
    count
}

/// Linear scale of a quadrant at `lod` relative to a base chunk: `2^lod`.
#[must_use]
pub fn lod_factor(lod: u32) -> u32 {
    debug_assert!(lod <= MAX_LOD, "LOD {lod} exceeds MAX_LOD {MAX_LOD}");
    1 << lod.min(MAX_LOD)
}
