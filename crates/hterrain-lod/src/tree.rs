//! The LOD quadtree: configuration, per-frame update and teardown.
//!
//! # Update rule
//!
//! Every visited quadrant compares its distance to the viewer against
//! `split_distance = base_size * 2^lod * split_scale`:
//!
//! - a leaf above LOD 0 closer than that splits into four children;
//! - a branch whose four children are all leaves, farther than that, joins.
//!
//! Both tests are strict, and the join is checked one level above where the
//! matching split was decided, which gives the boundary its hysteresis.
//!
//! A single [`QuadTreeLod::update`] converges for a static viewer. Chunks are
//! only requested for quadrants that end the pass as leaves, so a quadrant
//! that keeps splitting, or a join absorbed by its parent's join in the same
//! pass, never costs a make/recycle pair.

use glam::Vec3;

use crate::callbacks::{LodCallbacks, MakeFn, RecycleFn, VerticalBoundsFn};
use crate::coord::{MAX_LOD, compute_lod_count, lod_factor};
use crate::{QuadCoord, QuadNode};

/// Lower bound for [`QuadTreeLod::set_split_scale`].
pub const MIN_SPLIT_SCALE: f32 = 2.0;
/// Upper bound for [`QuadTreeLod::set_split_scale`].
pub const MAX_SPLIT_SCALE: f32 = 5.0;

const DEFAULT_BASE_SIZE: u32 = 16;

/// What one [`QuadTreeLod::update`] call changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Leaves that became branches.
    pub splits: usize,
    /// Branches that became leaves.
    pub joins: usize,
    /// Chunks obtained from the make callback.
    pub chunks_made: usize,
    /// Chunks handed to the recycle callback.
    pub chunks_recycled: usize,
    /// Malformed vertical bounds replies.
    pub bounds_errors: usize,
    /// Quadrants whose distance was evaluated.
    pub nodes_visited: usize,
}

impl UpdateStats {
    /// True if the tree structure changed.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.splits > 0 || self.joins > 0
    }
}

/// Level-of-detail quadtree over a square terrain.
///
/// The root covers the whole terrain at LOD `max_depth`; LOD 0 quadrants are
/// `base_size` world units wide. Chunk payloads of type `C` are created and
/// released through the callbacks given to [`Self::set_callbacks`]. Dropping
/// the tree recycles every chunk it still holds.
pub struct QuadTreeLod<C> {
    root: QuadNode<C>,
    max_depth: u32,
    base_size: u32,
    split_scale: f32,
    callbacks: LodCallbacks<C>,
}

impl<C> Default for QuadTreeLod<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> QuadTreeLod<C> {
    /// An empty tree with no callbacks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: QuadNode::leaf(QuadCoord::root(0)),
            max_depth: 0,
            base_size: DEFAULT_BASE_SIZE,
            split_scale: MIN_SPLIT_SCALE,
            callbacks: LodCallbacks::default(),
        }
    }

    /// Install the chunk factory, recycler and optional bounds provider.
    ///
    /// Chunks already in the tree will be released through the new recycler.
    pub fn set_callbacks(
        &mut self,
        make: Option<MakeFn<C>>,
        recycle: Option<RecycleFn<C>>,
        vertical_bounds: Option<VerticalBoundsFn>,
    ) {
        log::debug!(
            "LOD callbacks set (make: {}, recycle: {}, vertical bounds: {})",
            make.is_some(),
            recycle.is_some(),
            vertical_bounds.is_some()
        );
        self.callbacks = LodCallbacks::new(make, recycle, vertical_bounds);
    }

    /// Join the whole tree, recycling every chunk, and reset sizes to zero.
    pub fn clear(&mut self) {
        let recycled = join_all_recursively(&mut self.root, &mut self.callbacks);
        if recycled > 0 {
            log::debug!("LOD tree cleared, {recycled} chunks recycled");
        }
        self.max_depth = 0;
        self.base_size = 0;
        self.root = QuadNode::leaf(QuadCoord::root(0));
    }

    /// Number of LOD levels above the base needed to cover `full_size`.
    #[must_use]
    pub fn compute_lod_count(&self, base_size: u32, full_size: u32) -> u32 {
        compute_lod_count(base_size, full_size)
    }

    /// Number of distinct LOD levels, `max_depth + 1`.
    #[must_use]
    pub fn get_lod_count(&self) -> u32 {
        self.max_depth + 1
    }

    /// Linear scale of a quadrant at `lod` relative to the base, `2^lod`.
    #[must_use]
    pub fn get_lod_factor(&self, lod: u32) -> u32 {
        lod_factor(lod)
    }

    /// Rebuild for a terrain `full_size` wide made of `base_size` chunks.
    ///
    /// Clears first. No chunk is made until the next [`Self::update`].
    pub fn create_from_sizes(&mut self, base_size: u32, full_size: u32) {
        self.clear();
        let depth = compute_lod_count(base_size, full_size);
        if depth > MAX_LOD {
            log::warn!("LOD depth {depth} for sizes {base_size}/{full_size} capped at {MAX_LOD}");
        }
        self.base_size = base_size;
        self.max_depth = depth.min(MAX_LOD);
        self.root = QuadNode::leaf(QuadCoord::root(self.max_depth));
        log::debug!(
            "LOD tree sized: base {base_size}, full {full_size}, {} levels",
            self.get_lod_count()
        );
    }

    /// Set how far each LOD spreads. Clamped to `[2.0, 5.0]`.
    ///
    /// Higher values keep detail further out; lower values decimate sooner.
    pub fn set_split_scale(&mut self, split_scale: f32) {
        self.split_scale = if split_scale.is_nan() {
            MIN_SPLIT_SCALE
        } else {
            split_scale.clamp(MIN_SPLIT_SCALE, MAX_SPLIT_SCALE)
        };
    }

    /// Current split scale.
    #[must_use]
    pub fn get_split_scale(&self) -> f32 {
        self.split_scale
    }

    /// Coarsest LOD, the depth of the root.
    #[must_use]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// World size of a LOD 0 quadrant.
    #[must_use]
    pub fn base_size(&self) -> u32 {
        self.base_size
    }

    /// Root node, for read-only inspection.
    #[must_use]
    pub fn root(&self) -> &QuadNode<C> {
        &self.root
    }

    /// Distance under which a quadrant at `lod` splits.
    #[must_use]
    pub fn split_distance(&self, lod: u32) -> f32 {
        split_distance(self.base_size, self.split_scale, lod)
    }

    /// Split and join quadrants around `viewer_position`.
    ///
    /// Call once per frame. Ends with a chunk on the root if the root is a
    /// leaf without one, so the coarsest level stays visible.
    pub fn update(&mut self, viewer_position: Vec3) -> UpdateStats {
        let mut pass = UpdatePass {
            callbacks: &mut self.callbacks,
            base_size: self.base_size,
            split_scale: self.split_scale,
            viewer: viewer_position,
            stats: UpdateStats::default(),
        };
        pass.update_node(&mut self.root);

        if self.root.is_leaf() && !self.root.has_chunk() {
            pass.fill_leaf(&mut self.root);
        }

        let stats = pass.stats;
        if stats.changed() {
            log::debug!(
                "LOD update: {} splits, {} joins, {} made, {} recycled",
                stats.splits,
                stats.joins,
                stats.chunks_made,
                stats.chunks_recycled
            );
        }
        stats
    }

    /// True if the tree has never been split and holds no chunk.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.is_leaf() && !self.root.has_chunk()
    }

    /// Coordinates of every leaf, depth first.
    #[must_use]
    pub fn leaves(&self) -> Vec<QuadCoord> {
        self.root.all_leaves()
    }

    /// Every chunk in the tree with the quadrant it belongs to.
    #[must_use]
    pub fn chunks(&self) -> Vec<(QuadCoord, &C)> {
        let mut result = Vec::new();
        self.root.visit_leaves(&mut |node| {
            if let Some(chunk) = node.chunk() {
                result.push((node.coord(), chunk));
            }
        });
        result
    }

    /// Chunk held by the leaf at `coord`, if that leaf exists and has one.
    #[must_use]
    pub fn chunk(&self, coord: QuadCoord) -> Option<&C> {
        self.root.find(coord).and_then(QuadNode::chunk)
    }

    /// Number of nodes, branches included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Number of leaves.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }

    /// Number of leaves holding a chunk.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.root.chunk_count()
    }

    /// Leaf covering the world point `(world_x, world_z)`.
    ///
    /// Returns `None` outside the terrain.
    #[must_use]
    pub fn find_leaf(&self, world_x: f32, world_z: f32) -> Option<QuadCoord> {
        let extent = self.base_size as f32 * lod_factor(self.max_depth) as f32;
        if !(0.0..extent).contains(&world_x) || !(0.0..extent).contains(&world_z) {
            return None;
        }
        let mut node = &self.root;
        while let Some(children) = node.children() {
            let coord = node.coord();
            let size = chunk_size(self.base_size, coord.lod);
            let mid_x = (coord.x as f32 + 0.5) * size;
            let mid_z = (coord.y as f32 + 0.5) * size;
            let index = usize::from(world_x >= mid_x) | (usize::from(world_z >= mid_z) << 1);
            node = &children[index];
        }
        Some(node.coord())
    }
}

impl<C> Drop for QuadTreeLod<C> {
    fn drop(&mut self) {
        join_all_recursively(&mut self.root, &mut self.callbacks);
    }
}

fn chunk_size(base_size: u32, lod: u32) -> f32 {
    base_size as f32 * lod_factor(lod) as f32
}

/// Truncated to a whole distance, matching the integer thresholds terrain
/// chunk sizes are tuned against.
fn split_distance(base_size: u32, split_scale: f32, lod: u32) -> f32 {
    (chunk_size(base_size, lod) * split_scale).trunc()
}

/// Recycle every chunk under `node`, children before parents, and leave
/// `node` as an empty leaf. Returns the number of chunks recycled.
fn join_all_recursively<C>(node: &mut QuadNode<C>, callbacks: &mut LodCallbacks<C>) -> usize {
    let mut recycled = 0;
    if let Some(children) = node.children_mut() {
        for child in children.iter_mut() {
            recycled += join_all_recursively(child, callbacks);
        }
    }
    node.collapse();
    if let Some(chunk) = node.take_chunk() {
        callbacks.recycle_chunk(chunk, node.coord());
        recycled += 1;
    }
    recycled
}

/// State for one walk of the tree.
struct UpdatePass<'a, C> {
    callbacks: &'a mut LodCallbacks<C>,
    base_size: u32,
    split_scale: f32,
    viewer: Vec3,
    stats: UpdateStats,
}

impl<C> UpdatePass<'_, C> {
    /// World-space centre of a quadrant, raised to the middle of its
    /// terrain height range when a bounds provider is configured.
    fn node_center(&mut self, coord: QuadCoord) -> Vec3 {
        let size = chunk_size(self.base_size, coord.lod);
        let mut center = Vec3::new(
            (coord.x as f32 + 0.5) * size,
            0.0,
            (coord.y as f32 + 0.5) * size,
        );
        match self.callbacks.vertical_bounds(coord) {
            Some(Ok(bounds)) => center.y = bounds.midpoint(),
            Some(Err(err)) => {
                log::error!("{err}");
                self.stats.bounds_errors += 1;
            }
            None => {}
        }
        center
    }

    fn distance_to_viewer(&mut self, coord: QuadCoord) -> f32 {
        self.stats.nodes_visited += 1;
        self.node_center(coord).distance(self.viewer)
    }

    fn should_split(&mut self, coord: QuadCoord) -> bool {
        coord.lod > 0
            && self.distance_to_viewer(coord)
                < split_distance(self.base_size, self.split_scale, coord.lod)
    }

    /// Visit `node` and its subtree.
    ///
    /// Returns `true` when `node` joined during this pass. It is then an empty
    /// leaf and the caller decides whether it gets a chunk or is absorbed by a
    /// join one level up.
    fn update_node(&mut self, node: &mut QuadNode<C>) -> bool {
        let coord = node.coord();

        if node.is_leaf() {
            if self.should_split(coord) {
                self.split(node);
            }
            return false;
        }

        let distance = self.distance_to_viewer(coord);
        let mut joined = [false; 4];
        let mut all_leaves = true;
        if let Some(children) = node.children_mut() {
            for (child, slot) in children.iter_mut().zip(joined.iter_mut()) {
                *slot = self.update_node(child);
                all_leaves &= child.is_leaf();
            }
        }

        if all_leaves && distance > split_distance(self.base_size, self.split_scale, coord.lod) {
            self.join(node);
            return true;
        }

        if let Some(children) = node.children_mut() {
            for (child, joined) in children.iter_mut().zip(joined) {
                if joined {
                    self.fill_leaf(child);
                }
            }
        }
        false
    }

    /// Split a leaf. Children that need to split further are split right
    /// away; the rest get chunks. The leaf's own chunk is recycled last.
    fn split(&mut self, node: &mut QuadNode<C>) {
        let coord = node.coord();
        match node.subdivide_with(|coords| coords.map(|child| self.build_subtree(child))) {
            Ok(previous) => {
                self.stats.splits += 1;
                if let Some(chunk) = previous {
                    self.recycle(chunk, coord);
                }
                log::trace!("split {coord}");
            }
            Err(err) => log::error!("{err}"),
        }
    }

    fn build_subtree(&mut self, coord: QuadCoord) -> QuadNode<C> {
        let mut node = QuadNode::leaf(coord);
        if self.should_split(coord) {
            self.split(&mut node);
        } else {
            self.fill_leaf(&mut node);
        }
        node
    }

    /// Merge a branch's children back into it, recycling their chunks.
    /// The node is left as an empty leaf.
    fn join(&mut self, node: &mut QuadNode<C>) {
        let coord = node.coord();
        let Some(children) = node.collapse() else {
            return;
        };
        for mut child in *children {
            self.stats.chunks_recycled += join_all_recursively(&mut child, self.callbacks);
        }
        self.stats.joins += 1;
        log::trace!("join {coord}");
    }

    /// Give an empty leaf its chunk.
    fn fill_leaf(&mut self, node: &mut QuadNode<C>) {
        if !node.is_leaf() || node.has_chunk() {
            return;
        }
        let coord = node.coord();
        if let Some(chunk) = self.callbacks.make_chunk(coord) {
            self.stats.chunks_made += 1;
            if let Err(chunk) = node.set_chunk(chunk) {
                self.recycle(chunk, coord);
            }
        }
    }

    fn recycle(&mut self, chunk: C, coord: QuadCoord) {
        self.callbacks.recycle_chunk(chunk, coord);
        self.stats.chunks_recycled += 1;
    }
}
