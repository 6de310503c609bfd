// -----------------------------------------------------------------------------
// Polygon DNA
// -----------------------------------------------------------------------------

use std::cmp::{max, min};
use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{FrameDimensions, IntRect};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One flat-colored, semi-transparent polygon. Never edited once it is part of
/// a candidate; operators build a modified copy instead.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub(crate) points: Vec<Point>,
    /// r, g, b
    pub(crate) color: [u8; 3],
    /// Opacity in [0, 1].
    pub(crate) alpha: f32,
}

impl Polygon {
    pub fn new(points: Vec<Point>, color: [u8; 3], alpha: f32) -> Self {
        Self { points, color, alpha: alpha.clamp(0.0, 1.0) }
    }

    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    #[inline]
    pub fn color(&self) -> [u8; 3] {
        self.color
    }

    #[inline]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Opacity quantized for integer blending.
    #[inline]
    pub(crate) fn alpha_u8(&self) -> u8 {
        (self.alpha * 255.0).round().clamp(0.0, 255.0) as u8
    }

    /// Center of the unclamped vertex bounds.
    pub(crate) fn bounds_center(&self) -> (i32, i32) {
        if self.points.is_empty() {
            return (0, 0);
        }
        let (mut x0, mut y0) = (i32::MAX, i32::MAX);
        let (mut x1, mut y1) = (i32::MIN, i32::MIN);
        for p in &self.points {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        ((x0 + x1) / 2, (y0 + y1) / 2)
    }
}

/// Ordered polygon set, painted back to front. Unchanged polygons are shared
/// between parent and child through `Arc`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Candidate {
    pub(crate) polygons: Vec<Arc<Polygon>>,
}

impl Candidate {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons: polygons.into_iter().map(Arc::new).collect() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.polygons.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> {
        self.polygons.iter().map(|p| p.as_ref())
    }

    /// Deep copy of the polygon list, independent of any population slot.
    pub fn to_polygons(&self) -> Vec<Polygon> {
        self.polygons.iter().map(|p| (**p).clone()).collect()
    }
}

/// Pixel-space bounds of everything the rasterizer may touch for `poly`,
/// clamped to the canvas.
pub(crate) fn polygon_bbox_px(poly: &Polygon, canvas_w: usize, canvas_h: usize) -> IntRect {
    if poly.points.is_empty() || canvas_w == 0 || canvas_h == 0 {
        return IntRect::empty();
    }
    let (mut lo_x, mut lo_y) = (i32::MAX, i32::MAX);
    let (mut hi_x, mut hi_y) = (i32::MIN, i32::MIN);
    for p in &poly.points {
        lo_x = lo_x.min(p.x);
        lo_y = lo_y.min(p.y);
        hi_x = hi_x.max(p.x);
        hi_y = hi_y.max(p.y);
    }
    let cw = canvas_w as i32;
    let ch = canvas_h as i32;
    if hi_x < 0 || hi_y < 0 || lo_x >= cw || lo_y >= ch {
        return IntRect::empty();
    }
    let min_x = min(lo_x.max(0), cw - 1) as usize;
    let min_y = min(lo_y.max(0), ch - 1) as usize;
    let max_x = max(hi_x.min(cw - 1), 0) as usize;
    let max_y = max(hi_y.min(ch - 1), 0) as usize;
    IntRect {
        x: min_x,
        y: min_y,
        w: max_x - min_x + 1,
        h: max_y - min_y + 1,
    }
}

// ---- random generation ----

/// Side length of the spawn box. Small local boxes are drawn three times as
/// often as full-canvas ones.
#[inline]
fn spawn_extent<R: Rng>(rng: &mut R, dims: FrameDimensions) -> (usize, usize) {
    let divisor = match rng.gen_range(0..12) {
        0..=2 => 7,
        3..=5 => 5,
        6..=8 => 3,
        _ => return (dims.width, dims.height),
    };
    (
        (2 + dims.width / divisor).min(dims.width),
        (2 + dims.height / divisor).min(dims.height),
    )
}

/// Fresh polygon with `3..=max_points` vertices inside a randomly placed box.
/// Vertices range over `0..=width` and `0..=height` so edges can reach the
/// last row and column of pixels.
pub(crate) fn random_polygon<R: Rng>(rng: &mut R, dims: FrameDimensions, max_points: usize) -> Polygon {
    let (bw, bh) = spawn_extent(rng, dims);
    let x0 = rng.gen_range(0..=dims.width.saturating_sub(bw)) as i32;
    let y0 = rng.gen_range(0..=dims.height.saturating_sub(bh)) as i32;

    let count = rng.gen_range(3..=max_points.max(3));
    let points = (0..count)
        .map(|_| Point::new(x0 + rng.gen_range(0..=bw) as i32, y0 + rng.gen_range(0..=bh) as i32))
        .collect();

    let color = [rng.gen::<u8>(), rng.gen::<u8>(), rng.gen::<u8>()];
    Polygon { points, color, alpha: rng.gen::<f32>() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg as PcgRng;

    fn square(x: i32, y: i32, side: i32) -> Polygon {
        Polygon::new(
            vec![
                Point::new(x, y),
                Point::new(x + side, y),
                Point::new(x + side, y + side),
                Point::new(x, y + side),
            ],
            [10, 20, 30],
            0.5,
        )
    }

    #[test]
    fn test_bbox_is_clamped_to_canvas() {
        let poly = square(-5, -5, 20);
        let bb = polygon_bbox_px(&poly, 10, 8);
        assert_eq!(bb, IntRect { x: 0, y: 0, w: 10, h: 8 });
    }

    #[test]
    fn test_bbox_outside_canvas_is_empty() {
        let poly = square(40, 40, 5);
        assert!(polygon_bbox_px(&poly, 10, 10).is_empty());
    }

    #[test]
    fn test_random_polygon_respects_bounds() {
        let mut rng = PcgRng::seed_from_u64(7);
        let dims = FrameDimensions { width: 50, height: 30 };
        for _ in 0..500 {
            let poly = random_polygon(&mut rng, dims, 7);
            assert!((3..=7).contains(&poly.points.len()));
            assert!((0.0..=1.0).contains(&poly.alpha));
            for p in &poly.points {
                assert!(p.x >= 0 && p.x <= 50);
                assert!(p.y >= 0 && p.y <= 30);
            }
        }
    }

    #[test]
    fn test_random_polygon_on_tiny_canvas() {
        let mut rng = PcgRng::seed_from_u64(3);
        let dims = FrameDimensions { width: 1, height: 1 };
        for _ in 0..50 {
            let poly = random_polygon(&mut rng, dims, 3);
            assert!(poly.points.iter().all(|p| (0..=1).contains(&p.x) && (0..=1).contains(&p.y)));
        }
    }

    #[test]
    fn test_candidate_deep_copy() {
        let cand = Candidate::new(vec![square(1, 1, 3)]);
        let copy = cand.to_polygons();
        assert_eq!(copy.len(), 1);
        assert_eq!(copy[0], *cand.polygons[0]);
    }
}
