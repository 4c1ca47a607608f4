//! Grayscale canvas with a depth buffer
//!
//! Intensity and depth are both stored as `f32` in [0, 1], row-major.
//! Depth 0 is the near plane and 1 is far, so a freshly created canvas
//! accepts any write nearer than the far plane.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{GrayImage, ImageFormat, Luma};

use crate::error::CanvasError;

/// Region of the canvas that accepts pixel writes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Viewport {
    /// The whole rectangle
    #[default]
    Full,
    /// The circle inscribed in the canvas, centred on it
    Circular,
}

impl Viewport {
    pub fn contains(self, px: i64, py: i64, width: usize, height: usize) -> bool {
        match self {
            Viewport::Full => true,
            Viewport::Circular => {
                let cx = width as f32 / 2.0;
                let cy = height as f32 / 2.0;
                let radius = width.min(height) as f32 / 2.0;
                let dx = px as f32 - cx;
                let dy = py as f32 - cy;
                (dx * dx + dy * dy).sqrt() <= radius
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Canvas {
    width: usize,
    height: usize,
    pixels: Vec<f32>,
    depth: Vec<f32>,
    viewport: Viewport,
}

fn alloc_plane(len: usize, value: f32) -> Result<Vec<f32>, CanvasError> {
    let mut plane = Vec::new();
    plane
        .try_reserve_exact(len)
        .map_err(|_| CanvasError::Allocation)?;
    plane.resize(len, value);
    Ok(plane)
}

impl Canvas {
    /// Create a canvas cleared to black with the depth buffer at far (1.0)
    pub fn new(width: usize, height: usize) -> Result<Self, CanvasError> {
        if width == 0 || height == 0 {
            return Err(CanvasError::InvalidDimensions { width, height });
        }
        let len = width
            .checked_mul(height)
            .ok_or(CanvasError::Allocation)?;

        // Both planes exist or neither does
        let pixels = alloc_plane(len, 0.0)?;
        let depth = alloc_plane(len, 1.0)?;

        Ok(Self {
            width,
            height,
            pixels,
            depth,
            viewport: Viewport::Full,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Row-major intensity plane
    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    /// Row-major depth plane
    pub fn depth(&self) -> &[f32] {
        &self.depth
    }

    pub fn intensity_at(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        if x < self.width && y < self.height {
            Some(self.depth[y * self.width + x])
        } else {
            None
        }
    }

    /// Fill the intensity plane. Depth is left alone.
    pub fn clear(&mut self, intensity: f32) {
        let intensity = intensity.clamp(0.0, 1.0);
        self.pixels.fill(intensity);
    }

    /// Fill the depth plane. Intensity is left alone.
    pub fn clear_depth(&mut self, depth: f32) {
        let depth = depth.clamp(0.0, 1.0);
        self.depth.fill(depth);
    }

    /// Depth-tested write at the nearest integer pixel.
    ///
    /// Writes only when `depth` is strictly nearer than the stored value,
    /// so on a tie the earlier pixel wins. Off-canvas or masked coordinates
    /// are ignored. Returns whether the pixel was written.
    pub fn put_pixel(&mut self, x: f32, y: f32, intensity: f32, depth: f32) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        let px = x.round() as i64;
        let py = y.round() as i64;

        if px < 0 || py < 0 || px >= self.width as i64 || py >= self.height as i64 {
            return false;
        }
        if !self.viewport.contains(px, py, self.width, self.height) {
            return false;
        }

        let intensity = intensity.clamp(0.0, 1.0);
        let depth = depth.clamp(0.0, 1.0);

        let idx = py as usize * self.width + px as usize;
        if depth < self.depth[idx] {
            self.pixels[idx] = intensity;
            self.depth[idx] = depth;
            return true;
        }
        false
    }

    /// DDA line from (x0, y0) to (x1, y1), both endpoints included.
    ///
    /// Every pixel shares the same `depth`. A `thickness` above 1 stamps a
    /// square of that side length at every step. The segment is clipped to
    /// the canvas (grown by the stamp size) before stepping, so endpoints far
    /// off-screen cost no more than the visible part.
    pub fn draw_line(
        &mut self,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        thickness: f32,
        intensity: f32,
        depth: f32,
    ) {
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return;
        }

        let margin = thickness.max(1.0).round() as f64 + 1.0;
        let Some((t0, t1)) = clip_segment(
            [x0 as f64, y0 as f64, x1 as f64, y1 as f64],
            [-margin, -margin, self.width as f64 + margin, self.height as f64 + margin],
        ) else {
            return;
        };

        let dx = x1 as f64 - x0 as f64;
        let dy = y1 as f64 - y0 as f64;
        let (x0, y0, x1, y1) = if t0 == 0.0 && t1 == 1.0 {
            (x0, y0, x1, y1)
        } else {
            (
                (x0 as f64 + t0 * dx) as f32,
                (y0 as f64 + t0 * dy) as f32,
                (x0 as f64 + t1 * dx) as f32,
                (y0 as f64 + t1 * dy) as f32,
            )
        };

        let dx = x1 - x0;
        let dy = y1 - y0;
        let steps = dx.abs().max(dy.abs());
        if steps == 0.0 {
            self.stamp(x0, y0, thickness, intensity, depth);
            return;
        }

        let x_inc = dx / steps;
        let y_inc = dy / steps;

        let n = steps.floor() as u64;
        for i in 0..=n {
            let i = i as f32;
            self.stamp(x0 + i * x_inc, y0 + i * y_inc, thickness, intensity, depth);
        }
    }

    fn stamp(&mut self, x: f32, y: f32, thickness: f32, intensity: f32, depth: f32) {
        if thickness <= 1.0 {
            self.put_pixel(x, y, intensity, depth);
            return;
        }

        let side = thickness.round() as i64;
        let lo = -(side - 1) / 2;
        let hi = lo + side - 1;
        for oy in lo..=hi {
            for ox in lo..=hi {
                self.put_pixel(x + ox as f32, y + oy as f32, intensity, depth);
            }
        }
    }

    /// Encode as plain-text PGM (`P2`, max value 255, one row per line)
    pub fn write_pgm<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        writeln!(out, "P2")?;
        writeln!(out, "{} {}", self.width, self.height)?;
        writeln!(out, "255")?;

        for row in self.pixels.chunks(self.width) {
            let mut first = true;
            for &v in row {
                if !first {
                    out.write_all(b" ")?;
                }
                write!(out, "{}", to_gray(v))?;
                first = false;
            }
            out.write_all(b"\n")?;
        }
        Ok(())
    }

    pub fn to_pgm_string(&self) -> std::io::Result<String> {
        let mut buf = Vec::with_capacity(self.pixels.len() * 4 + 16);
        self.write_pgm(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Save as plain-text PGM
    pub fn save_pgm<P: AsRef<Path>>(&self, path: P) -> Result<(), CanvasError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            log::warn!("Failed to open {} for PGM export: {}", path.display(), e);
            e
        })?;
        let mut out = BufWriter::new(file);
        self.write_pgm(&mut out)?;
        out.flush()?;
        Ok(())
    }

    /// Parse plain-text PGM. Depth is reset to far.
    pub fn from_pgm_str(s: &str) -> Result<Self, CanvasError> {
        let mut tokens = s
            .lines()
            .map(|line| line.split('#').next().unwrap_or(""))
            .flat_map(str::split_whitespace);

        match tokens.next() {
            Some("P2") => {}
            Some(other) => return Err(CanvasError::Parse(format!("unexpected magic {:?}", other))),
            None => return Err(CanvasError::Parse("empty input".to_string())),
        }

        let mut next_number = |what: &str| -> Result<usize, CanvasError> {
            let tok = tokens
                .next()
                .ok_or_else(|| CanvasError::Parse(format!("missing {}", what)))?;
            tok.parse::<usize>()
                .map_err(|_| CanvasError::Parse(format!("bad {} {:?}", what, tok)))
        };

        let width = next_number("width")?;
        let height = next_number("height")?;
        let max_value = next_number("max value")?;
        if max_value == 0 {
            return Err(CanvasError::Parse("max value must be positive".to_string()));
        }

        // Count the pixel tokens before allocating anything sized by the header
        let expected = width
            .checked_mul(height)
            .ok_or_else(|| CanvasError::Parse(format!("{}x{} is too large", width, height)))?;
        let values: Vec<&str> = tokens.take(expected).collect();
        if values.len() < expected {
            return Err(CanvasError::Parse(format!(
                "expected {} pixels, found {}",
                expected,
                values.len()
            )));
        }

        let mut canvas = Canvas::new(width, height)?;
        for (slot, tok) in canvas.pixels.iter_mut().zip(values) {
            let v = tok
                .parse::<usize>()
                .map_err(|_| CanvasError::Parse(format!("bad pixel {:?}", tok)))?;
            if v > max_value {
                return Err(CanvasError::Parse(format!("pixel {} exceeds max value {}", v, max_value)));
            }
            *slot = v as f32 / max_value as f32;
        }
        Ok(canvas)
    }

    pub fn load_pgm<P: AsRef<Path>>(path: P) -> Result<Self, CanvasError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_pgm_str(&contents)
    }

    /// Convert to an 8-bit grayscale image
    pub fn to_gray_image(&self) -> GrayImage {
        GrayImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            Luma([to_gray(self.pixels[y as usize * self.width + x as usize])])
        })
    }

    /// Save as PNG through the `image` crate
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), CanvasError> {
        self.to_gray_image().save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

/// Liang-Barsky clip of `[x0, y0, x1, y1]` against `[min_x, min_y, max_x, max_y]`.
///
/// Returns the parameter range `(t0, t1)` of the visible part, or `None`
/// when the segment misses the rectangle.
fn clip_segment(seg: [f64; 4], rect: [f64; 4]) -> Option<(f64, f64)> {
    let [x0, y0, x1, y1] = seg;
    let [min_x, min_y, max_x, max_y] = rect;
    let dx = x1 - x0;
    let dy = y1 - y0;

    let mut t0 = 0.0;
    let mut t1 = 1.0;
    for (p, q) in [(-dx, x0 - min_x), (dx, max_x - x0), (-dy, y0 - min_y), (dy, max_y - y0)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = f64::max(t0, r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = f64::min(t1, r);
        }
    }
    Some((t0, t1))
}

/// Intensity in [0, 1] to an 8-bit gray level
fn to_gray(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("grayline-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_new_rejects_zero_dimensions() {
        assert!(matches!(
            Canvas::new(0, 10),
            Err(CanvasError::InvalidDimensions { width: 0, height: 10 })
        ));
        assert!(Canvas::new(10, 0).is_err());
        assert!(Canvas::new(0, 0).is_err());
    }

    #[test]
    fn test_new_is_black_and_far() {
        let c = Canvas::new(4, 3).unwrap();
        assert_eq!(c.pixels().len(), 12);
        assert_eq!(c.depth().len(), 12);
        assert!(c.pixels().iter().all(|&v| v == 0.0));
        assert!(c.depth().iter().all(|&d| d == 1.0));
    }

    #[test]
    fn test_clear_clamps_and_leaves_depth() {
        let mut c = Canvas::new(2, 2).unwrap();
        c.clear_depth(0.5);
        c.clear(1.7);
        assert!(c.pixels().iter().all(|&v| v == 1.0));
        assert!(c.depth().iter().all(|&d| d == 0.5));
        c.clear_depth(-3.0);
        assert!(c.depth().iter().all(|&d| d == 0.0));
        assert!(c.pixels().iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_depth_test_keeps_nearer() {
        let mut c = Canvas::new(8, 8).unwrap();
        assert!(c.put_pixel(3.0, 3.0, 0.9, 0.2));
        assert!(!c.put_pixel(3.0, 3.0, 0.1, 0.8));
        assert_eq!(c.intensity_at(3, 3), Some(0.9));
        assert_eq!(c.depth_at(3, 3), Some(0.2));
    }

    #[test]
    fn test_depth_test_overwrites_farther() {
        let mut c = Canvas::new(8, 8).unwrap();
        c.put_pixel(3.0, 3.0, 0.1, 0.8);
        c.put_pixel(3.0, 3.0, 0.9, 0.2);
        assert_eq!(c.intensity_at(3, 3), Some(0.9));
        assert_eq!(c.depth_at(3, 3), Some(0.2));
    }

    #[test]
    fn test_depth_tie_keeps_first() {
        let mut c = Canvas::new(4, 4).unwrap();
        c.put_pixel(1.0, 1.0, 0.3, 0.5);
        assert!(!c.put_pixel(1.0, 1.0, 0.7, 0.5));
        assert_eq!(c.intensity_at(1, 1), Some(0.3));
    }

    #[test]
    fn test_put_pixel_rounds_and_ignores_out_of_bounds() {
        let mut c = Canvas::new(4, 4).unwrap();
        c.put_pixel(1.6, 2.4, 1.0, 0.0);
        assert_eq!(c.intensity_at(2, 2), Some(1.0));
        assert!(!c.put_pixel(-0.6, 0.0, 1.0, 0.0));
        assert!(!c.put_pixel(3.6, 0.0, 1.0, 0.0));
        assert!(!c.put_pixel(f32::NAN, 0.0, 1.0, 0.0));
    }

    #[test]
    fn test_circular_viewport_masks_corners() {
        let mut c = Canvas::new(10, 10).unwrap();
        c.set_viewport(Viewport::Circular);
        assert!(!c.put_pixel(0.0, 0.0, 1.0, 0.0));
        assert!(c.put_pixel(5.0, 5.0, 1.0, 0.0));
    }

    #[test]
    fn test_draw_line_horizontal() {
        let mut c = Canvas::new(10, 3).unwrap();
        c.draw_line(1.0, 1.0, 6.0, 1.0, 1.0, 1.0, 0.5);
        for x in 1..=6 {
            assert_eq!(c.intensity_at(x, 1), Some(1.0), "x = {}", x);
            assert_eq!(c.depth_at(x, 1), Some(0.5));
        }
        assert_eq!(c.intensity_at(0, 1), Some(0.0));
        assert_eq!(c.intensity_at(7, 1), Some(0.0));
    }

    #[test]
    fn test_draw_line_diagonal_hits_both_ends() {
        let mut c = Canvas::new(10, 10).unwrap();
        c.draw_line(8.0, 1.0, 2.0, 7.0, 1.0, 0.6, 0.5);
        assert_eq!(c.intensity_at(8, 1), Some(0.6));
        assert_eq!(c.intensity_at(2, 7), Some(0.6));
        assert_eq!(c.intensity_at(5, 4), Some(0.6));
    }

    #[test]
    fn test_draw_line_single_point() {
        let mut c = Canvas::new(5, 5).unwrap();
        c.draw_line(2.0, 2.0, 2.0, 2.0, 1.0, 1.0, 0.5);
        let lit = c.pixels().iter().filter(|&&v| v > 0.0).count();
        assert_eq!(lit, 1);
        assert_eq!(c.intensity_at(2, 2), Some(1.0));
    }

    #[test]
    fn test_draw_line_thickness_stamps_square() {
        let mut c = Canvas::new(9, 9).unwrap();
        c.draw_line(4.0, 4.0, 4.0, 4.0, 3.0, 1.0, 0.5);
        let lit = c.pixels().iter().filter(|&&v| v > 0.0).count();
        assert_eq!(lit, 9);
        assert_eq!(c.intensity_at(3, 3), Some(1.0));
        assert_eq!(c.intensity_at(5, 5), Some(1.0));
    }

    #[test]
    fn test_draw_line_far_endpoint_is_clipped() {
        let mut c = Canvas::new(100, 10).unwrap();
        c.draw_line(10.0, 5.0, 1.0e8, 5.0, 1.0, 1.0, 0.5);
        for x in 10..100 {
            assert_eq!(c.intensity_at(x, 5), Some(1.0), "x = {}", x);
        }
        assert_eq!(c.intensity_at(9, 5), Some(0.0));
        assert_eq!(c.pixels().iter().filter(|&&v| v > 0.0).count(), 90);
    }

    #[test]
    fn test_draw_line_far_diagonal_keeps_slope() {
        let mut c = Canvas::new(50, 50).unwrap();
        c.draw_line(-2.0e8, -2.0e8, 2.0e8, 2.0e8, 1.0, 1.0, 0.5);
        for i in 0..50 {
            assert_eq!(c.intensity_at(i, i), Some(1.0), "i = {}", i);
        }
        assert_eq!(c.intensity_at(10, 30), Some(0.0));
    }

    #[test]
    fn test_draw_line_fully_off_canvas_draws_nothing() {
        let mut c = Canvas::new(10, 10).unwrap();
        c.draw_line(-5.0e7, -3.0, 5.0e7, -3.0, 3.0, 1.0, 0.5);
        c.draw_line(0.0, 0.0, f32::INFINITY, 4.0, 1.0, 1.0, 0.5);
        assert!(c.pixels().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_pgm_layout() {
        let mut c = Canvas::new(3, 2).unwrap();
        c.put_pixel(0.0, 0.0, 1.0, 0.0);
        c.put_pixel(2.0, 1.0, 0.5, 0.0);
        assert_eq!(c.to_pgm_string().unwrap(), "P2\n3 2\n255\n255 0 0\n0 0 128\n");
    }

    #[test]
    fn test_pgm_round_trip_cleared_canvas() {
        let mut c = Canvas::new(7, 5).unwrap();
        c.clear(0.4);
        let path = temp_path("clear.pgm");
        c.save_pgm(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let values: Vec<u32> = text
            .split_whitespace()
            .skip(4)
            .map(|t| t.parse().unwrap())
            .collect();
        assert_eq!(values.len(), 35);
        assert!(values.iter().all(|&v| v == 102));

        let parsed = Canvas::load_pgm(&path).unwrap();
        assert_eq!(parsed.width(), 7);
        assert_eq!(parsed.height(), 5);
        assert!(parsed.pixels().iter().all(|&v| (v * 255.0).round() as u32 == 102));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_parse_rejects_bad_magic() {
        assert!(matches!(Canvas::from_pgm_str("P5\n1 1\n255\n0\n"), Err(CanvasError::Parse(_))));
        assert!(matches!(Canvas::from_pgm_str("P2\n2 1\n255\n0\n"), Err(CanvasError::Parse(_))));
    }

    #[test]
    fn test_parse_rejects_short_body_before_allocating() {
        let err = Canvas::from_pgm_str("P2\n100000 100000\n255\n0 0 0\n").unwrap_err();
        assert!(matches!(err, CanvasError::Parse(ref m) if m.contains("found 3")));
        let huge = format!("P2\n{} 2\n255\n0\n", usize::MAX);
        assert!(matches!(Canvas::from_pgm_str(&huge), Err(CanvasError::Parse(_))));
    }

    #[test]
    fn test_save_to_missing_directory_fails() {
        let c = Canvas::new(2, 2).unwrap();
        let path = temp_path("no-such-dir").join("frame.pgm");
        assert!(matches!(c.save_pgm(&path), Err(CanvasError::Io(_))));
    }

    #[test]
    fn test_gray_image_matches_pgm_levels() {
        let mut c = Canvas::new(2, 1).unwrap();
        c.clear(0.4);
        let img = c.to_gray_image();
        assert_eq!(img.dimensions(), (2, 1));
        assert_eq!(img.get_pixel(1, 0).0, [102]);
    }
}
