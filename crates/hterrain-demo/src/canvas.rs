//! RGBA raster target for the tree debug draw, with PNG export.

use std::path::Path;

use hterrain_config::MAX_DEBUG_IMAGE_SIDE;
use hterrain_lod::{DebugColor, DebugRect, DrawTarget};

use crate::error::DemoError;

/// Outline colour drawn around every rectangle.
const OUTLINE: [u8; 4] = [0, 0, 0, 255];

/// A 2D image stored as row-major RGBA pixels.
///
/// Rectangles arrive in base-chunk units and are scaled by `scale` pixels per
/// unit. Anything outside the image is clipped.
#[derive(Clone, Debug)]
pub struct DebugCanvas {
    pub width: u32,
    pub height: u32,
    /// Pixels per base-chunk unit.
    pub scale: u32,
    /// Length = `width * height * 4`.
    pub pixels: Vec<u8>,
}

impl DebugCanvas {
    /// A black canvas covering `units` base chunks per side.
    ///
    /// Fails when the side would exceed [`MAX_DEBUG_IMAGE_SIDE`] pixels.
    pub fn new(units: u32, scale: u32) -> Result<Self, DemoError> {
        let side = units
            .checked_mul(scale)
            .filter(|side| *side <= MAX_DEBUG_IMAGE_SIDE)
            .ok_or(DemoError::CanvasTooLarge { units, scale })?
            .max(1);
        Ok(Self {
            width: side,
            height: side,
            scale,
            pixels: vec![0; side as usize * side as usize * 4],
        })
    }

    #[cfg(test)]
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = self.index(x, y);
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let idx = self.index(x, y);
        self.pixels[idx..idx + 4].copy_from_slice(&rgba);
    }

    /// Encode the canvas as an 8-bit RGBA PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, DemoError> {
        let mut png_buf = Vec::new();
        {
            let mut encoder =
                png::Encoder::new(std::io::Cursor::new(&mut png_buf), self.width, self.height);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&self.pixels)?;
        }
        Ok(png_buf)
    }

    /// Encode and write to `path`, creating parent directories.
    pub fn save_png(&self, path: &Path) -> Result<(), DemoError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.encode_png()?)?;
        Ok(())
    }
}

impl DrawTarget for DebugCanvas {
    fn draw_rect(&mut self, rect: DebugRect, color: DebugColor) {
        let scale = self.scale as f32;
        let x0 = (rect.position.x * scale).max(0.0) as u32;
        let y0 = (rect.position.y * scale).max(0.0) as u32;
        let x1 = (((rect.position.x + rect.size.x) * scale).max(0.0) as u32).min(self.width);
        let y1 = (((rect.position.y + rect.size.y) * scale).max(0.0) as u32).min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let fill = color.to_rgba8();
        let outlined = x1 - x0 > 2 && y1 - y0 > 2;
        for y in y0..y1 {
            for x in x0..x1 {
                let edge = x == x0 || y == y0 || x == x1 - 1 || y == y1 - 1;
                self.set_pixel(x, y, if outlined && edge { OUTLINE } else { fill });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn rect(x: f32, y: f32, size: f32) -> DebugRect {
        DebugRect {
            position: Vec2::new(x, y),
            size: Vec2::splat(size),
        }
    }

    #[test]
    fn test_canvas_dimensions() {
        let canvas = DebugCanvas::new(16, 4).unwrap();
        assert_eq!((canvas.width, canvas.height), (64, 64));
        assert_eq!(canvas.pixels.len(), 64 * 64 * 4);
    }

    #[test]
    fn test_oversized_canvas_rejected() {
        let overflow = DebugCanvas::new(1 << 31, 4);
        assert!(matches!(
            overflow,
            Err(DemoError::CanvasTooLarge {
                units: 2_147_483_648,
                scale: 4
            })
        ));
        assert!(DebugCanvas::new(MAX_DEBUG_IMAGE_SIDE, 2).is_err());
    }

    #[test]
    fn test_rect_fill_and_outline() {
        let mut canvas = DebugCanvas::new(4, 4).unwrap();
        canvas.draw_rect(rect(1.0, 1.0, 2.0), DebugColor::new(1.0, 0.0, 1.0, 1.0));

        assert_eq!(canvas.get_pixel(4, 4), OUTLINE);
        assert_eq!(canvas.get_pixel(11, 11), OUTLINE);
        assert_eq!(canvas.get_pixel(6, 6), [255, 0, 255, 255]);
        assert_eq!(canvas.get_pixel(0, 0), [0, 0, 0, 0], "outside untouched");
    }

    #[test]
    fn test_small_rect_has_no_outline() {
        let mut canvas = DebugCanvas::new(4, 2).unwrap();
        canvas.draw_rect(rect(0.0, 0.0, 1.0), DebugColor::new(0.0, 1.0, 0.0, 1.0));
        assert_eq!(canvas.get_pixel(0, 0), [0, 255, 0, 255]);
        assert_eq!(canvas.get_pixel(1, 1), [0, 255, 0, 255]);
    }

    #[test]
    fn test_rect_outside_is_clipped() {
        let mut canvas = DebugCanvas::new(2, 2).unwrap();
        canvas.draw_rect(rect(1.5, 1.5, 8.0), DebugColor::new(1.0, 1.0, 1.0, 1.0));
        canvas.draw_rect(rect(10.0, 10.0, 1.0), DebugColor::new(1.0, 1.0, 1.0, 1.0));
        // Clipped to a single pixel, too thin for an outline.
        assert_eq!(canvas.get_pixel(3, 3), [255, 255, 255, 255]);
        assert_eq!(canvas.get_pixel(0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn test_png_signature() {
        let canvas = DebugCanvas::new(2, 2).unwrap();
        let bytes = canvas.encode_png().unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_save_png_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("tree.png");
        DebugCanvas::new(3, 1).unwrap().save_png(&path).unwrap();
        assert!(path.exists());
    }
}
