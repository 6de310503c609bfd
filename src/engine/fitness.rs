// -----------------------------------------------------------------------------
// Fitness: per-cell squared error grid
// -----------------------------------------------------------------------------

use std::cmp::Ordering;

use rayon::prelude::*;

use super::geom::rects_intersect;
use super::raster::{CH_B, CH_R};
use super::{FrameDimensions, IntRect};
use crate::error::FitnessError;

pub const DEFAULT_GRID_DIVISIONS: usize = 8;

/// Squared BGR error of a rendering, split over an N x N grid.
/// `total` is always the sum of `cells`; lower is better. Scores compare and
/// order by `total` alone.
#[derive(Clone, Debug)]
pub struct Score {
    divisions: usize,
    /// Row-major, `divisions * divisions` entries.
    cells: Vec<u64>,
    total: u64,
}

impl Score {
    pub(crate) fn from_cells(divisions: usize, cells: Vec<u64>) -> Self {
        let total = cells.iter().copied().sum();
        Self { divisions, cells, total }
    }

    /// Placeholder that every real score beats.
    pub(crate) fn worst() -> Self {
        Self { divisions: 0, cells: Vec::new(), total: u64::MAX }
    }

    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[inline]
    pub fn divisions(&self) -> usize {
        self.divisions
    }

    #[inline]
    pub fn cells(&self) -> &[u64] {
        &self.cells
    }

    #[inline]
    pub fn cell(&self, cx: usize, cy: usize) -> u64 {
        self.cells[cy * self.divisions + cx]
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.total == other.total
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.total.cmp(&other.total)
    }
}

/// Scores renderings against a cached target.
#[derive(Clone, Debug)]
pub struct FitnessEvaluator {
    target: Vec<u8>,
    dims: FrameDimensions,
    divisions: usize,
}

impl FitnessEvaluator {
    pub fn new(target: Vec<u8>, dims: FrameDimensions) -> Result<Self, FitnessError> {
        Self::with_divisions(target, dims, DEFAULT_GRID_DIVISIONS)
    }

    pub fn with_divisions(
        target: Vec<u8>,
        dims: FrameDimensions,
        divisions: usize,
    ) -> Result<Self, FitnessError> {
        let mut evaluator = Self { target: Vec::new(), dims, divisions: divisions.max(1) };
        evaluator.set_target(target, dims)?;
        Ok(evaluator)
    }

    /// Replace the cached target. Scores computed against the old target are
    /// no longer comparable.
    pub fn set_target(&mut self, target: Vec<u8>, dims: FrameDimensions) -> Result<(), FitnessError> {
        if dims.width == 0 || dims.height == 0 {
            return Err(FitnessError::EmptyTarget { width: dims.width, height: dims.height });
        }
        check_len(&target, dims)?;
        self.target = target;
        self.dims = dims;
        Ok(())
    }

    #[inline]
    pub fn dimensions(&self) -> FrameDimensions {
        self.dims
    }

    #[inline]
    pub fn divisions(&self) -> usize {
        self.divisions
    }

    #[inline]
    pub fn target(&self) -> &[u8] {
        &self.target
    }

    /// Score `test`. Cells outside `changed` are copied from `previous`; with
    /// either one missing every cell is recomputed.
    pub fn score(
        &self,
        test: &[u8],
        previous: Option<&Score>,
        changed: Option<&IntRect>,
    ) -> Result<Score, FitnessError> {
        check_len(test, self.dims)?;
        match (previous, changed) {
            (Some(prev), Some(region)) if prev.divisions == self.divisions => {
                Ok(self.score_incremental(test, prev, region))
            }
            _ => Ok(self.score_full(test)),
        }
    }

    fn score_full(&self, test: &[u8]) -> Score {
        let n = self.divisions;
        let cells: Vec<u64> = (0..n * n)
            .into_par_iter()
            .map(|idx| self.cell_sse(test, &self.cell_rect(idx % n, idx / n)))
            .collect();
        Score::from_cells(n, cells)
    }

    fn score_incremental(&self, test: &[u8], prev: &Score, region: &IntRect) -> Score {
        let n = self.divisions;
        let mut cells = prev.cells.clone();

        if region.w >= region.h {
            for cy in 0..n {
                for cx in 0..n {
                    self.refresh_cell(test, region, cx, cy, &mut cells);
                }
            }
        } else {
            for cx in 0..n {
                for cy in 0..n {
                    self.refresh_cell(test, region, cx, cy, &mut cells);
                }
            }
        }
        Score::from_cells(n, cells)
    }

    #[inline]
    fn refresh_cell(&self, test: &[u8], region: &IntRect, cx: usize, cy: usize, cells: &mut [u64]) {
        let rect = self.cell_rect(cx, cy);
        if rects_intersect(&rect, region) {
            cells[cy * self.divisions + cx] = self.cell_sse(test, &rect);
        }
    }

    /// Pixel rect of one grid cell; the last row and column absorb remainders.
    pub(crate) fn cell_rect(&self, cx: usize, cy: usize) -> IntRect {
        let n = self.divisions;
        let cw = self.dims.width / n;
        let ch = self.dims.height / n;
        let x0 = cx * cw;
        let y0 = cy * ch;
        let x1 = if cx + 1 == n { self.dims.width } else { x0 + cw };
        let y1 = if cy + 1 == n { self.dims.height } else { y0 + ch };
        IntRect { x: x0, y: y0, w: x1 - x0, h: y1 - y0 }
    }

    fn cell_sse(&self, test: &[u8], rect: &IntRect) -> u64 {
        let target = &self.target;
        let row_stride = self.dims.width * 4;
        let mut sse: u64 = 0;

        for y in rect.y..rect.bottom() {
            let row_off = y * row_stride;
            let mut i = row_off + rect.x * 4;
            let row_end = row_off + rect.right() * 4;

            while i + 16 <= row_end {
                // unroll 4 pixels
                sse += pixel_sse(test, target, i);
                sse += pixel_sse(test, target, i + 4);
                sse += pixel_sse(test, target, i + 8);
                sse += pixel_sse(test, target, i + 12);
                i += 16;
            }
            while i < row_end {
                sse += pixel_sse(test, target, i);
                i += 4;
            }
        }
        sse
    }
}

#[inline(always)]
fn pixel_sse(test: &[u8], target: &[u8], i: usize) -> u64 {
    let mut e: u64 = 0;
    for c in CH_B..=CH_R {
        let d = test[i + c] as i32 - target[i + c] as i32;
        e += (d * d) as u64;
    }
    e
}

fn check_len(buf: &[u8], dims: FrameDimensions) -> Result<(), FitnessError> {
    let expected = dims.buffer_len();
    if buf.len() != expected {
        return Err(FitnessError::DimensionMismatch {
            expected,
            actual: buf.len(),
            width: dims.width,
            height: dims.height,
        });
    }
    Ok(())
}
