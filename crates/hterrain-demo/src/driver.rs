//! Runs the LOD tree along the configured viewer path.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use hterrain_config::{Config, ViewerSettings};
use hterrain_lod::{QuadCoord, QuadTreeLod, UpdateStats, VerticalBoundsFn};
use tracing::{debug, info, warn};

use crate::chunk_pool::{ChunkPool, DemoChunk, PoolStats, pool_callbacks};
use crate::height_field::HeightField;

/// Totals over a whole run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u32,
    pub splits: usize,
    pub joins: usize,
    pub chunks_made: usize,
    pub chunks_recycled: usize,
    pub bounds_errors: usize,
    /// Most leaves seen after any single tick.
    pub peak_leaves: usize,
}

impl RunSummary {
    fn record(&mut self, stats: &UpdateStats, leaves: usize) {
        self.ticks += 1;
        self.splits += stats.splits;
        self.joins += stats.joins;
        self.chunks_made += stats.chunks_made;
        self.chunks_recycled += stats.chunks_recycled;
        self.bounds_errors += stats.bounds_errors;
        self.peak_leaves = self.peak_leaves.max(leaves);
    }
}

/// A configured tree together with the pool that feeds it.
pub struct Driver {
    pub tree: QuadTreeLod<DemoChunk>,
    pool: Rc<RefCell<ChunkPool>>,
    ground: HeightField,
    viewer: ViewerSettings,
}

impl Driver {
    pub fn new(config: &Config) -> Self {
        let base_size = config.lod.base_size;
        let pool = Rc::new(RefCell::new(ChunkPool::new(
            HeightField::new(config.terrain.clone(), base_size),
            base_size,
        )));
        let (make, recycle) = pool_callbacks(&pool);

        let bounds_field = HeightField::new(config.terrain.clone(), base_size);
        let vertical_bounds: VerticalBoundsFn =
            Box::new(move |coord: QuadCoord| Some(bounds_field.bounds(coord)));

        let mut tree = QuadTreeLod::new();
        tree.set_callbacks(Some(make), Some(recycle), Some(vertical_bounds));
        tree.create_from_sizes(base_size, config.lod.full_size);
        tree.set_split_scale(config.lod.split_scale);
        info!(
            "LOD tree: {} levels, base {}, split scale {}",
            tree.get_lod_count(),
            tree.base_size(),
            tree.get_split_scale()
        );

        Self {
            tree,
            pool,
            ground: HeightField::new(config.terrain.clone(), base_size),
            viewer: config.viewer.clone(),
        }
    }

    /// Viewer position at `tick`, floating `height` above the ground.
    pub fn viewer_position(&self, tick: u32) -> Vec3 {
        let t = if self.viewer.ticks > 1 {
            tick as f32 / (self.viewer.ticks - 1) as f32
        } else {
            0.0
        };
        let mut position = Vec3::from(self.viewer.start).lerp(Vec3::from(self.viewer.end), t);
        position.y +=
            self.ground.sample(f64::from(position.x), f64::from(position.z)) + self.viewer.height;
        position
    }

    /// Update the tree once per tick along the whole path.
    pub fn run(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();
        for tick in 0..self.viewer.ticks {
            let viewer = self.viewer_position(tick);
            let stats = self.tree.update(viewer);
            let leaves = self.tree.leaf_count();
            summary.record(&stats, leaves);
            if stats.changed() {
                debug!(
                    "tick {tick}: viewer {viewer}, {} splits, {} joins, {leaves} leaves",
                    stats.splits, stats.joins
                );
            }
        }
        info!(
            "{} ticks: {} splits, {} joins, {} chunks made, {} recycled, peak {} leaves",
            summary.ticks,
            summary.splits,
            summary.joins,
            summary.chunks_made,
            summary.chunks_recycled,
            summary.peak_leaves
        );
        if summary.bounds_errors > 0 {
            warn!("{} malformed vertical bounds replies", summary.bounds_errors);
        }
        summary
    }

    /// Lowest and highest height sample over every visible chunk.
    pub fn visible_height_range(&self) -> Option<(f32, f32)> {
        self.tree
            .chunks()
            .into_iter()
            .flat_map(|(_, chunk)| chunk.heights.iter().copied())
            .fold(None, |range, h| match range {
                None => Some((h, h)),
                Some((lo, hi)) => Some((lo.min(h), hi.max(h))),
            })
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.borrow().stats()
    }
}
