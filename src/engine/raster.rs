// -----------------------------------------------------------------------------
// Rasterization & blending
// -----------------------------------------------------------------------------
//
// Canvas layout: 4 bytes per pixel, [unused/alpha, blue, green, red].

use super::{polygon_bbox_px, Candidate, FrameDimensions, Polygon};

pub(crate) const CH_B: usize = 1;
pub(crate) const CH_G: usize = 2;
pub(crate) const CH_R: usize = 3;

const OPAQUE_BLACK: [u8; 4] = [255, 0, 0, 0];

/// src-over of a flat color onto one pixel, integer math with rounding.
#[inline]
pub(crate) fn blend_src_over(dst: &mut [u8], rgb: [u8; 3], a: u8) {
    let a = a as u32;
    if a == 0 {
        return;
    }
    let ia = 255 - a;
    let b = ((rgb[2] as u32 * a) + (dst[CH_B] as u32 * ia) + 127) / 255;
    let g = ((rgb[1] as u32 * a) + (dst[CH_G] as u32 * ia) + 127) / 255;
    let r = ((rgb[0] as u32 * a) + (dst[CH_R] as u32 * ia) + 127) / 255;
    dst[0] = 255;
    dst[CH_B] = b as u8;
    dst[CH_G] = g as u8;
    dst[CH_R] = r as u8;
}

/// Fill the canvas black, then paint every polygon in order.
pub fn render_candidate(candidate: &Candidate, dims: FrameDimensions, out: &mut [u8]) {
    debug_assert_eq!(out.len(), dims.buffer_len());
    for px in out.chunks_exact_mut(4) {
        px.copy_from_slice(&OPAQUE_BLACK);
    }
    let mut crossings: Vec<f64> = Vec::with_capacity(16);
    for poly in candidate.polygons() {
        fill_polygon_over(out, dims, poly, &mut crossings);
    }
}

/// Even-odd scanline fill sampled at pixel centers. Never writes outside
/// `polygon_bbox_px`.
pub(crate) fn fill_polygon_over(
    out: &mut [u8],
    dims: FrameDimensions,
    poly: &Polygon,
    crossings: &mut Vec<f64>,
) {
    let a = poly.alpha_u8();
    if a == 0 || poly.points.len() < 3 {
        return;
    }
    let bb = polygon_bbox_px(poly, dims.width, dims.height);
    if bb.is_empty() {
        return;
    }
    let pts = &poly.points;
    let n = pts.len();
    let row_stride = dims.width * 4;

    for y in bb.y..bb.bottom() {
        let sy = y as f64 + 0.5;

        crossings.clear();
        for i in 0..n {
            let p = pts[i];
            let q = pts[(i + 1) % n];
            let (py, qy) = (p.y as f64, q.y as f64);
            if (py > sy) != (qy > sy) {
                let t = (sy - py) / (qy - py);
                crossings.push(p.x as f64 + t * (q.x - p.x) as f64);
            }
        }
        if crossings.len() < 2 {
            continue;
        }
        crossings.sort_by(|l, r| l.total_cmp(r));

        let row = y * row_stride;
        for span in crossings.chunks_exact(2) {
            // pixel x is inside when x + 0.5 lies in [span[0], span[1])
            let x0 = ((span[0] - 0.5).ceil().max(bb.x as f64)) as usize;
            let x1 = ((span[1] - 0.5).ceil().min(bb.right() as f64)).max(0.0) as usize;
            let mut i = row + x0 * 4;
            for _ in x0..x1 {
                blend_src_over(&mut out[i..i + 4], poly.color, a);
                i += 4;
            }
        }
    }
}

/// Linear blend of two equally sized canvases: `step / steps` of the way from
/// `from` to `to`.
pub(crate) fn crossfade(from: &[u8], to: &[u8], step: usize, steps: usize, out: &mut [u8]) {
    debug_assert_eq!(from.len(), to.len());
    debug_assert_eq!(from.len(), out.len());
    let steps = steps.max(1) as u64;
    let t = (step as u64).min(steps);
    let it = steps - t;
    for ((o, &f), &g) in out.iter_mut().zip(from).zip(to) {
        *o = ((f as u64 * it + g as u64 * t + steps / 2) / steps) as u8;
    }
}
