//! Debug visualisation of the tree layout.
//!
//! [`QuadTreeLod::debug_draw_tree`] walks the leaves and emits one rectangle
//! per leaf into any [`DrawTarget`]. Positions and sizes are in base-chunk
//! units, so a LOD 0 leaf is a 1x1 rectangle.

use glam::Vec2;

use crate::{QuadNode, QuadTreeLod, lod_factor};

/// Axis-aligned rectangle in base-chunk units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugRect {
    /// Top-left corner.
    pub position: Vec2,
    /// Width and height.
    pub size: Vec2,
}

/// Linear RGBA colour, channels in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebugColor {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl DebugColor {
    /// Construct a colour from its four channels.
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Convert to 8-bit RGBA, clamping each channel.
    #[must_use]
    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

/// Anything that can receive filled rectangles.
pub trait DrawTarget {
    /// Fill `rect` with `color`.
    fn draw_rect(&mut self, rect: DebugRect, color: DebugColor);
}

/// Colour of a leaf: red fades with LOD, green checkers siblings 1 and 2,
/// blue marks a leaf that holds a chunk.
#[must_use]
pub fn leaf_color(lod: u32, sibling_index: usize, has_chunk: bool) -> DebugColor {
    let checker = if matches!(sibling_index, 1 | 2) { 1.0 } else { 0.0 };
    DebugColor::new(
        (1.0 - lod as f32 * 0.2).max(0.0),
        0.2 * checker,
        if has_chunk { 1.0 } else { 0.0 },
        1.0,
    )
}

impl<C> QuadTreeLod<C> {
    /// Draw every leaf of the tree into `target`, depth first.
    pub fn debug_draw_tree(&self, target: &mut impl DrawTarget) {
        draw_node(self.root(), 0, target);
    }
}

fn draw_node<C>(node: &QuadNode<C>, sibling_index: usize, target: &mut impl DrawTarget) {
    match node.children() {
        Some(children) => {
            for (index, child) in children.iter().enumerate() {
                draw_node(child, index, target);
            }
        }
        None => {
            let coord = node.coord();
            let factor = lod_factor(coord.lod) as f32;
            let rect = DebugRect {
                position: Vec2::new(coord.x as f32, coord.y as f32) * factor,
                size: Vec2::splat(factor),
            };
            target.draw_rect(rect, leaf_color(coord.lod, sibling_index, node.has_chunk()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QuadCoord;
    use glam::Vec3;

    #[derive(Default)]
    struct Recorder {
        rects: Vec<(DebugRect, DebugColor)>,
    }

    impl DrawTarget for Recorder {
        fn draw_rect(&mut self, rect: DebugRect, color: DebugColor) {
            self.rects.push((rect, color));
        }
    }

    #[test]
    fn test_unsplit_root_draws_one_rect() {
        let mut tree = QuadTreeLod::<u32>::new();
        tree.create_from_sizes(16, 64);
        let mut recorder = Recorder::default();
        tree.debug_draw_tree(&mut recorder);

        assert_eq!(recorder.rects.len(), 1);
        let (rect, color) = recorder.rects[0];
        assert_eq!(rect.position, Vec2::ZERO);
        assert_eq!(rect.size, Vec2::splat(4.0));
        assert!((color.r - 0.6).abs() < 1e-6);
        assert_eq!((color.g, color.b, color.a), (0.0, 0.0, 1.0));
    }

    #[test]
    fn test_split_tree_draws_each_leaf() {
        let mut tree = QuadTreeLod::<u32>::new();
        tree.set_callbacks(Some(Box::new(|_: QuadCoord| Some(0))), None, None);
        tree.create_from_sizes(16, 32);
        tree.update(Vec3::new(16.0, 0.0, 16.0));

        let mut recorder = Recorder::default();
        tree.debug_draw_tree(&mut recorder);
        assert_eq!(recorder.rects.len(), 4);

        let positions: Vec<Vec2> = recorder.rects.iter().map(|(r, _)| r.position).collect();
        assert_eq!(
            positions,
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.0, 1.0),
                Vec2::new(1.0, 1.0)
            ]
        );
        for (index, (rect, color)) in recorder.rects.iter().enumerate() {
            assert_eq!(rect.size, Vec2::ONE);
            assert_eq!(color.r, 1.0);
            assert_eq!(color.b, 1.0);
            let expected_green = if index == 1 || index == 2 { 0.2 } else { 0.0 };
            assert_eq!(color.g, expected_green);
        }
    }

    #[test]
    fn test_red_channel_never_negative() {
        assert_eq!(leaf_color(9, 0, false).r, 0.0);
        assert_eq!(leaf_color(5, 3, true).r, 0.0);
    }

    #[test]
    fn test_to_rgba8_clamps() {
        let color = DebugColor::new(1.5, -0.2, 0.5, 1.0);
        assert_eq!(color.to_rgba8(), [255, 0, 128, 255]);
    }
}
