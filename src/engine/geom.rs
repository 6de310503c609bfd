// src/engine/geom.rs
use std::cmp::{max, min};
use super::IntRect;

#[inline]
pub(crate) fn clamp_i32(v: i32, lo: i32, hi: i32) -> i32 {
    if v < lo {
        lo
    } else if v > hi {
        hi
    } else {
        v
    }
}

/// Smallest rect covering both; an empty side yields the other.
pub(crate) fn union_rect(a: &IntRect, b: &IntRect) -> IntRect {
    if a.is_empty() {
        return *b;
    }
    if b.is_empty() {
        return *a;
    }
    let x0 = min(a.x, b.x);
    let y0 = min(a.y, b.y);
    let x1 = max(a.right(), b.right());
    let y1 = max(a.bottom(), b.bottom());
    IntRect {
        x: x0,
        y: y0,
        w: x1 - x0,
        h: y1 - y0,
    }
}

/// True when the two rects share at least one pixel.
#[inline]
pub(crate) fn rects_intersect(a: &IntRect, b: &IntRect) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.x < b.right() && b.x < a.right() && a.y < b.bottom() && b.y < a.bottom()
}
