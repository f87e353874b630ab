//! Quadrant nodes of the LOD tree.

use crate::{LodError, QuadCoord};

/// A node in the LOD quadtree.
///
/// Either a leaf, shown as at most one chunk, or a branch with exactly four
/// children. A branch carries no chunk, so "children and payload at the same
/// time" cannot be represented.
#[derive(Debug)]
pub enum QuadNode<C> {
    /// A visible quadrant and its chunk, if the factory produced one.
    Leaf {
        /// Which quadrant this is.
        coord: QuadCoord,
        /// Payload handle owned through the make/recycle contract.
        chunk: Option<C>,
    },
    /// A quadrant subdivided into four finer ones.
    /// Children are ordered by [`QuadCoord::sibling_index`]:
    /// \[(x, y), (x+1, y), (x, y+1), (x+1, y+1)\] at the child LOD.
    Branch {
        /// Which quadrant this is.
        coord: QuadCoord,
        /// The four child nodes.
        children: Box<[QuadNode<C>; 4]>,
    },
}

impl<C> QuadNode<C> {
    /// An empty leaf.
    #[must_use]
    pub fn leaf(coord: QuadCoord) -> Self {
        QuadNode::Leaf { coord, chunk: None }
    }

    /// Returns the coordinate of this node (leaf or branch).
    #[must_use]
    pub fn coord(&self) -> QuadCoord {
        match self {
            QuadNode::Leaf { coord, .. } | QuadNode::Branch { coord, .. } => *coord,
        }
    }

    /// Returns true if this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, QuadNode::Leaf { .. })
    }

    /// The leaf's chunk. Always `None` for a branch.
    #[must_use]
    pub fn chunk(&self) -> Option<&C> {
        match self {
            QuadNode::Leaf { chunk, .. } => chunk.as_ref(),
            QuadNode::Branch { .. } => None,
        }
    }

    /// True for a leaf that currently holds a chunk.
    #[must_use]
    pub fn has_chunk(&self) -> bool {
        self.chunk().is_some()
    }

    /// The four children, or `None` for a leaf.
    #[must_use]
    pub fn children(&self) -> Option<&[QuadNode<C>; 4]> {
        match self {
            QuadNode::Branch { children, .. } => Some(&**children),
            QuadNode::Leaf { .. } => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut [QuadNode<C>; 4]> {
        match self {
            QuadNode::Branch { children, .. } => Some(&mut **children),
            QuadNode::Leaf { .. } => None,
        }
    }

    /// Store a chunk in a leaf. A branch hands the chunk straight back.
    pub(crate) fn set_chunk(&mut self, new_chunk: C) -> Result<(), C> {
        match self {
            QuadNode::Leaf { chunk, .. } => {
                debug_assert!(chunk.is_none(), "leaf chunk overwritten");
                *chunk = Some(new_chunk);
                Ok(())
            }
            QuadNode::Branch { .. } => Err(new_chunk),
        }
    }

    /// Remove and return the leaf's chunk.
    pub(crate) fn take_chunk(&mut self) -> Option<C> {
        match self {
            QuadNode::Leaf { chunk, .. } => chunk.take(),
            QuadNode::Branch { .. } => None,
        }
    }

    /// Turn this leaf into a branch whose children come from `build`.
    ///
    /// `build` receives the four child coordinates and only runs once the
    /// split is known to be valid. On success returns the chunk the leaf held,
    /// which the caller must release.
    pub(crate) fn subdivide_with<F>(&mut self, build: F) -> Result<Option<C>, LodError>
    where
        F: FnOnce([QuadCoord; 4]) -> [QuadNode<C>; 4],
    {
        let coord = self.coord();
        let QuadNode::Leaf { chunk, .. } = self else {
            return Err(LodError::AlreadySubdivided { coord });
        };
        let Some(child_coords) = coord.children() else {
            return Err(LodError::BelowBaseLod { coord });
        };
        let previous = chunk.take();
        *self = QuadNode::Branch {
            coord,
            children: Box::new(build(child_coords)),
        };
        Ok(previous)
    }

    /// Turn this branch back into an empty leaf, returning the detached
    /// children. No-op returning `None` for a leaf.
    pub(crate) fn collapse(&mut self) -> Option<Box<[QuadNode<C>; 4]>> {
        if self.is_leaf() {
            return None;
        }
        let coord = self.coord();
        match std::mem::replace(self, QuadNode::leaf(coord)) {
            QuadNode::Branch { children, .. } => Some(children),
            QuadNode::Leaf { .. } => None,
        }
    }

    /// Collect all current leaf coordinates, children in index order.
    #[must_use]
    pub fn all_leaves(&self) -> Vec<QuadCoord> {
        let mut result = Vec::new();
        self.visit_leaves(&mut |node| result.push(node.coord()));
        result
    }

    /// Call `visit` on every leaf, depth first, children in index order.
    pub fn visit_leaves<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a QuadNode<C>),
    {
        match self {
            QuadNode::Leaf { .. } => visit(self),
            QuadNode::Branch { children, .. } => {
                for child in children.iter() {
                    child.visit_leaves(visit);
                }
            }
        }
    }

    /// Total number of nodes in this subtree, including itself.
    #[must_use]
    pub fn node_count(&self) -> usize {
        match self {
            QuadNode::Leaf { .. } => 1,
            QuadNode::Branch { children, .. } => {
                1 + children.iter().map(QuadNode::node_count).sum::<usize>()
            }
        }
    }

    /// Number of leaves in this subtree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        self.visit_leaves(&mut |_| count += 1);
        count
    }

    /// Number of leaves in this subtree that hold a chunk.
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        let mut count = 0;
        self.visit_leaves(&mut |node| {
            if node.has_chunk() {
                count += 1;
            }
        });
        count
    }

    /// Find the node with exactly this coordinate, descending from here.
    #[must_use]
    pub fn find(&self, target: QuadCoord) -> Option<&QuadNode<C>> {
        let coord = self.coord();
        if coord == target {
            return Some(self);
        }
        if target.lod >= coord.lod {
            return None;
        }
        // Project the target onto this node's child level to pick the branch.
        let shift = coord.lod - 1 - target.lod;
        let child_x = target.x >> shift;
        let child_y = target.y >> shift;
        if child_x >> 1 != coord.x || child_y >> 1 != coord.y {
            return None;
        }
        let index = ((child_x & 1) | ((child_y & 1) << 1)) as usize;
        self.children()?[index].find(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split_leaf(node: &mut QuadNode<u32>) -> Option<u32> {
        node.subdivide_with(|coords| coords.map(QuadNode::leaf))
            .expect("leaf above base LOD should split")
    }

    #[test]
    fn test_new_leaf_is_empty() {
        let node = QuadNode::<u32>::leaf(QuadCoord::root(3));
        assert!(node.is_leaf());
        assert!(!node.has_chunk());
        assert!(node.children().is_none());
        assert_eq!(node.coord(), QuadCoord::root(3));
    }

    #[test]
    fn test_subdivide_returns_previous_chunk() {
        let mut node = QuadNode::leaf(QuadCoord::root(2));
        node.set_chunk(42).unwrap();

        let previous = split_leaf(&mut node);
        assert_eq!(previous, Some(42));
        assert!(!node.is_leaf());
        assert!(node.chunk().is_none());

        let children = node.children().unwrap();
        for (i, child) in children.iter().enumerate() {
            assert_eq!(child.coord(), QuadCoord::root(2).child(i).unwrap());
            assert!(child.is_leaf());
        }
    }

    #[test]
    fn test_subdivide_branch_is_rejected() {
        let mut node = QuadNode::<u32>::leaf(QuadCoord::root(2));
        split_leaf(&mut node);

        let mut built = false;
        let result = node.subdivide_with(|coords| {
            built = true;
            coords.map(QuadNode::leaf)
        });
        assert_eq!(
            result.unwrap_err(),
            LodError::AlreadySubdivided {
                coord: QuadCoord::root(2)
            }
        );
        assert!(!built, "children must not be built for a rejected split");
        assert_eq!(node.node_count(), 5);
    }

    #[test]
    fn test_subdivide_at_base_lod_is_rejected() {
        let mut node = QuadNode::<u32>::leaf(QuadCoord::new(4, 4, 0));
        node.set_chunk(1).unwrap();
        let result = node.subdivide_with(|coords| coords.map(QuadNode::leaf));
        assert!(matches!(result, Err(LodError::BelowBaseLod { .. })));
        assert_eq!(node.chunk(), Some(&1), "rejected split keeps the chunk");
    }

    #[test]
    fn test_branch_refuses_chunk() {
        let mut node = QuadNode::<u32>::leaf(QuadCoord::root(1));
        split_leaf(&mut node);
        assert_eq!(node.set_chunk(9), Err(9));
        assert_eq!(node.take_chunk(), None);
    }

    #[test]
    fn test_collapse_reverses_subdivide() {
        let mut node = QuadNode::<u32>::leaf(QuadCoord::root(3));
        split_leaf(&mut node);
        let children = node.collapse().expect("branch should collapse");
        assert_eq!(children.len(), 4);
        assert!(node.is_leaf());
        assert!(!node.has_chunk());
        assert!(node.collapse().is_none());
    }

    #[test]
    fn test_counts_and_leaf_order() {
        let mut root = QuadNode::<u32>::leaf(QuadCoord::root(2));
        split_leaf(&mut root);
        if let Some(children) = root.children_mut() {
            split_leaf(&mut children[3]);
            children[0].set_chunk(5).unwrap();
        }

        assert_eq!(root.node_count(), 1 + 4 + 4);
        assert_eq!(root.leaf_count(), 3 + 4);
        assert_eq!(root.chunk_count(), 1);

        let leaves = root.all_leaves();
        assert_eq!(leaves[0], QuadCoord::new(0, 0, 1));
        assert_eq!(leaves[3], QuadCoord::new(2, 2, 0));
        assert_eq!(leaves[6], QuadCoord::new(3, 3, 0));
    }

    #[test]
    fn test_find_descends_to_target() {
        let mut root = QuadNode::<u32>::leaf(QuadCoord::root(2));
        split_leaf(&mut root);
        if let Some(children) = root.children_mut() {
            split_leaf(&mut children[1]);
        }

        let target = QuadCoord::new(3, 1, 0);
        assert_eq!(root.find(target).map(QuadNode::coord), Some(target));
        assert!(root.find(QuadCoord::new(0, 0, 0)).is_none(), "not split there");
        assert!(root.find(QuadCoord::new(9, 0, 0)).is_none(), "outside the root");
        assert!(root.find(QuadCoord::root(3)).is_none());
    }
}
