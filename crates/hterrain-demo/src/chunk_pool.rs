//! Chunk factory for the LOD tree that reuses released chunk allocations.
//!
//! Each [`DemoChunk`] carries a grid of terrain heights. Building a new grid
//! is the expensive part, so released chunks go onto a free list and their
//! buffers are refilled for the next quadrant instead of being reallocated.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use hterrain_lod::{MakeFn, QuadCoord, RecycleFn, lod_factor};

use crate::height_field::HeightField;

/// Height samples per chunk edge.
pub const CHUNK_RESOLUTION: usize = 9;

/// Terrain payload for one visible quadrant.
#[derive(Debug)]
pub struct DemoChunk {
    pub coord: QuadCoord,
    /// Row-major `CHUNK_RESOLUTION^2` heights.
    pub heights: Vec<f32>,
}

/// Allocation counters, also used to check that every chunk came back.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Chunks built from a fresh allocation.
    pub allocated: usize,
    /// Chunks built from a pooled allocation.
    pub reused: usize,
    /// Chunks currently owned by the tree.
    pub live: usize,
    /// Released chunks waiting for reuse.
    pub free: usize,
}

/// Free list of chunk allocations plus the set of chunks handed out.
pub struct ChunkPool {
    heights: HeightField,
    base_size: u32,
    free: Vec<DemoChunk>,
    live: HashSet<QuadCoord>,
    allocated: usize,
    reused: usize,
}

impl ChunkPool {
    pub fn new(heights: HeightField, base_size: u32) -> Self {
        Self {
            heights,
            base_size,
            free: Vec::new(),
            live: HashSet::new(),
            allocated: 0,
            reused: 0,
        }
    }

    /// Take a chunk for `coord`, reusing a released allocation when possible.
    pub fn acquire(&mut self, coord: QuadCoord) -> DemoChunk {
        let mut chunk = match self.free.pop() {
            Some(mut chunk) => {
                self.reused += 1;
                chunk.heights.clear();
                chunk
            }
            None => {
                self.allocated += 1;
                DemoChunk {
                    coord,
                    heights: Vec::with_capacity(CHUNK_RESOLUTION * CHUNK_RESOLUTION),
                }
            }
        };
        chunk.coord = coord;
        self.fill_heights(&mut chunk);
        if !self.live.insert(coord) {
            tracing::error!("chunk {coord} handed out twice");
        }
        chunk
    }

    /// Give a chunk back to the pool.
    pub fn release(&mut self, chunk: DemoChunk, coord: QuadCoord) {
        if chunk.coord != coord {
            tracing::error!("chunk for {} released as {coord}", chunk.coord);
        }
        if !self.live.remove(&chunk.coord) {
            tracing::error!("chunk {} released but was not live", chunk.coord);
        }
        self.free.push(chunk);
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocated: self.allocated,
            reused: self.reused,
            live: self.live.len(),
            free: self.free.len(),
        }
    }

    fn fill_heights(&self, chunk: &mut DemoChunk) {
        let size = f64::from(self.base_size) * f64::from(lod_factor(chunk.coord.lod));
        let step = size / (CHUNK_RESOLUTION - 1) as f64;
        let x0 = f64::from(chunk.coord.x) * size;
        let z0 = f64::from(chunk.coord.y) * size;
        for row in 0..CHUNK_RESOLUTION {
            for col in 0..CHUNK_RESOLUTION {
                let height = self
                    .heights
                    .sample(x0 + col as f64 * step, z0 + row as f64 * step);
                chunk.heights.push(height);
            }
        }
    }
}

/// Make and recycle callbacks sharing one pool.
pub fn pool_callbacks(pool: &Rc<RefCell<ChunkPool>>) -> (MakeFn<DemoChunk>, RecycleFn<DemoChunk>) {
    let make_pool = Rc::clone(pool);
    let recycle_pool = Rc::clone(pool);
    let make: MakeFn<DemoChunk> =
        Box::new(move |coord: QuadCoord| Some(make_pool.borrow_mut().acquire(coord)));
    let recycle: RecycleFn<DemoChunk> = Box::new(move |chunk: DemoChunk, coord: QuadCoord| {
        recycle_pool.borrow_mut().release(chunk, coord);
    });
    (make, recycle)
}
