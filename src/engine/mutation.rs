// -----------------------------------------------------------------------------
// Mutation operators
// -----------------------------------------------------------------------------

use std::sync::Arc;

use rand::prelude::*;
use rand_pcg::Pcg64Mcg as PcgRng;

use super::polygon::random_polygon;
use super::population::GenerationMember;
use super::{clamp_i32, polygon_bbox_px, union_rect};
use super::{AdaptiveMutationScheduler, Candidate, FrameDimensions, IntRect, Point, Polygon};
use crate::settings::Settings;

// ---------- Mutation Enum -------------
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MutationOperator {
    AddPolygon,
    RemovePolygon,
    AddPoint,
    RemovePoint,
    MovePoint,
    RectifyPoint,
    ReorderPoly,
    ShrinkPoly,
    EnlargePoly,
    ShiftPoly,
    ChangeColor,
    ChangeAlpha,
    White,
    Black,
    Breed,
    BreedElite,
    CompleteChange,
}

impl MutationOperator {
    pub const COUNT: usize = 17;

    /// Enumeration order; sampling walks operators in this order.
    pub const ALL: [MutationOperator; Self::COUNT] = [
        MutationOperator::AddPolygon,
        MutationOperator::RemovePolygon,
        MutationOperator::AddPoint,
        MutationOperator::RemovePoint,
        MutationOperator::MovePoint,
        MutationOperator::RectifyPoint,
        MutationOperator::ReorderPoly,
        MutationOperator::ShrinkPoly,
        MutationOperator::EnlargePoly,
        MutationOperator::ShiftPoly,
        MutationOperator::ChangeColor,
        MutationOperator::ChangeAlpha,
        MutationOperator::White,
        MutationOperator::Black,
        MutationOperator::Breed,
        MutationOperator::BreedElite,
        MutationOperator::CompleteChange,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            MutationOperator::AddPolygon => "AddPolygon",
            MutationOperator::RemovePolygon => "RemovePolygon",
            MutationOperator::AddPoint => "AddPoint",
            MutationOperator::RemovePoint => "RemovePoint",
            MutationOperator::MovePoint => "MovePoint",
            MutationOperator::RectifyPoint => "RectifyPoint",
            MutationOperator::ReorderPoly => "ReorderPoly",
            MutationOperator::ShrinkPoly => "ShrinkPoly",
            MutationOperator::EnlargePoly => "EnlargePoly",
            MutationOperator::ShiftPoly => "ShiftPoly",
            MutationOperator::ChangeColor => "ChangeColor",
            MutationOperator::ChangeAlpha => "ChangeAlpha",
            MutationOperator::White => "White",
            MutationOperator::Black => "Black",
            MutationOperator::Breed => "Breed",
            MutationOperator::BreedElite => "BreedElite",
            MutationOperator::CompleteChange => "CompleteChange",
        }
    }
}

// ---------- Mutation result -------------

/// A child candidate plus the pixel region where it can differ from its parent.
#[derive(Clone, Debug)]
pub(crate) struct Mutation {
    pub(crate) candidate: Candidate,
    /// Union of the touched polygon's bounds before and after.
    pub(crate) changed_region: IntRect,
    pub(crate) operator: MutationOperator,
}

/// Where the breed operators find donors.
pub(crate) trait MemberSource {
    fn random_member(&self, elite_only: bool) -> Option<Arc<GenerationMember>>;
}

// ---------- Mutator -------------

/// Per-worker mutation engine: owns its generator and operator statistics.
pub(crate) struct Mutator {
    rng: PcgRng,
    scheduler: AdaptiveMutationScheduler,
    dims: FrameDimensions,
    max_polygons: usize,
    max_points: usize,
    max_point_movement: i32,
    max_color_change: i32,
}

impl Mutator {
    pub(crate) fn new(settings: &Settings, dims: FrameDimensions, rng: PcgRng) -> Self {
        Self {
            rng,
            scheduler: AdaptiveMutationScheduler::new(),
            dims,
            max_polygons: settings.max_polygons.max(1),
            max_points: settings.max_points.max(3),
            max_point_movement: settings.max_point_movement as i32,
            max_color_change: settings.max_color_change as i32,
        }
    }

    /// Produce one child of `parent`. Empty or missing parents can only grow.
    pub(crate) fn improve<S: MemberSource + ?Sized>(
        &mut self,
        parent: Option<&Candidate>,
        pool: &S,
    ) -> Mutation {
        let parent = match parent {
            Some(p) if !p.is_empty() => p,
            _ => {
                let base = parent.cloned().unwrap_or_default();
                return self.grow_from_nothing(base);
            }
        };

        let op = self.scheduler.sample_operator(&mut self.rng);
        match self.apply_operator(op, parent, pool) {
            Some((candidate, changed_region)) => Mutation { candidate, changed_region, operator: op },
            None => {
                self.scheduler.record_outcome(op, false);
                let (candidate, changed_region) = self.complete_change(parent);
                Mutation { candidate, changed_region, operator: MutationOperator::CompleteChange }
            }
        }
    }

    pub(crate) fn record_outcome(&mut self, op: MutationOperator, succeeded: bool) {
        self.scheduler.record_outcome(op, succeeded);
    }

    #[inline]
    pub(crate) fn scheduler(&self) -> &AdaptiveMutationScheduler {
        &self.scheduler
    }

    /// Random polygon for seeding a fresh population.
    pub(crate) fn random_polygon(&mut self) -> Polygon {
        random_polygon(&mut self.rng, self.dims, self.max_points)
    }

    fn grow_from_nothing(&mut self, mut base: Candidate) -> Mutation {
        let poly = self.random_polygon();
        let changed_region = polygon_bbox_px(&poly, self.dims.width, self.dims.height);
        base.polygons.push(Arc::new(poly));
        Mutation { candidate: base, changed_region, operator: MutationOperator::AddPolygon }
    }

    /// Apply `op` to a non-empty parent; `None` when its precondition fails.
    pub(crate) fn apply_operator<S: MemberSource + ?Sized>(
        &mut self,
        op: MutationOperator,
        parent: &Candidate,
        pool: &S,
    ) -> Option<(Candidate, IntRect)> {
        debug_assert!(!parent.is_empty());
        match op {
            MutationOperator::AddPolygon => self.add_polygon(parent),
            MutationOperator::RemovePolygon => Some(self.remove_polygon(parent)),
            MutationOperator::AddPoint => self.add_point(parent),
            MutationOperator::RemovePoint => self.remove_point(parent),
            MutationOperator::MovePoint => Some(self.move_point(parent)),
            MutationOperator::RectifyPoint => Some(self.rectify_point(parent)),
            MutationOperator::ReorderPoly => self.reorder_poly(parent),
            MutationOperator::ShrinkPoly => Some(self.scale_poly(parent, true)),
            MutationOperator::EnlargePoly => Some(self.scale_poly(parent, false)),
            MutationOperator::ShiftPoly => Some(self.shift_poly(parent)),
            MutationOperator::ChangeColor => Some(self.change_color(parent)),
            MutationOperator::ChangeAlpha => Some(self.change_alpha(parent)),
            MutationOperator::White => Some(self.solid(parent, [255, 255, 255])),
            MutationOperator::Black => Some(self.solid(parent, [0, 0, 0])),
            MutationOperator::Breed => self.breed(parent, pool, false),
            MutationOperator::BreedElite => self.breed(parent, pool, true),
            MutationOperator::CompleteChange => Some(self.complete_change(parent)),
        }
    }

    // ---- helpers ----

    #[inline]
    fn bbox(&self, poly: &Polygon) -> IntRect {
        polygon_bbox_px(poly, self.dims.width, self.dims.height)
    }

    #[inline]
    fn clip(&self, x: i32, y: i32) -> Point {
        Point::new(
            clamp_i32(x, 0, self.dims.width as i32),
            clamp_i32(y, 0, self.dims.height as i32),
        )
    }

    #[inline]
    fn jitter(&mut self, max: i32) -> i32 {
        self.rng.gen_range(-max..=max)
    }

    /// Swap polygon `idx` for `poly`, returning the child and old-or-new bounds.
    fn replace_at(&self, parent: &Candidate, idx: usize, poly: Polygon) -> (Candidate, IntRect) {
        let region = union_rect(&self.bbox(&parent.polygons[idx]), &self.bbox(&poly));
        let mut child = parent.clone();
        child.polygons[idx] = Arc::new(poly);
        (child, region)
    }

    /// Copy of a random polygon with `edit` applied.
    fn edit_random_polygon<F>(&mut self, parent: &Candidate, edit: F) -> (Candidate, IntRect)
    where
        F: FnOnce(&mut Self, &mut Polygon),
    {
        let idx = self.rng.gen_range(0..parent.len());
        let mut poly = (*parent.polygons[idx]).clone();
        edit(self, &mut poly);
        self.replace_at(parent, idx, poly)
    }

    // ---- operators ----

    fn add_polygon(&mut self, parent: &Candidate) -> Option<(Candidate, IntRect)> {
        if parent.len() >= self.max_polygons {
            return None;
        }
        let poly = self.random_polygon();
        let region = self.bbox(&poly);
        let mut child = parent.clone();
        child.polygons.push(Arc::new(poly));
        Some((child, region))
    }

    fn remove_polygon(&mut self, parent: &Candidate) -> (Candidate, IntRect) {
        let idx = self.rng.gen_range(0..parent.len());
        let mut child = parent.clone();
        let removed = child.polygons.remove(idx);
        (child, self.bbox(&removed))
    }

    fn add_point(&mut self, parent: &Candidate) -> Option<(Candidate, IntRect)> {
        let idx = self.rng.gen_range(0..parent.len());
        let n = parent.polygons[idx].points.len();
        if n >= self.max_points {
            return None;
        }
        let mut poly = (*parent.polygons[idx]).clone();
        // new vertex lands near the one it follows
        let pos = self.rng.gen_range(1..=n);
        let anchor = poly.points[pos - 1];
        let m = self.max_point_movement;
        let (dx, dy) = (self.jitter(m), self.jitter(m));
        let pt = self.clip(anchor.x + dx, anchor.y + dy);
        poly.points.insert(pos, pt);
        Some(self.replace_at(parent, idx, poly))
    }

    fn remove_point(&mut self, parent: &Candidate) -> Option<(Candidate, IntRect)> {
        let idx = self.rng.gen_range(0..parent.len());
        let n = parent.polygons[idx].points.len();
        if n <= 3 {
            return None;
        }
        let mut poly = (*parent.polygons[idx]).clone();
        poly.points.remove(self.rng.gen_range(0..n));
        Some(self.replace_at(parent, idx, poly))
    }

    fn move_point(&mut self, parent: &Candidate) -> (Candidate, IntRect) {
        self.edit_random_polygon(parent, |m, poly| {
            let i = m.rng.gen_range(0..poly.points.len());
            let max = m.max_point_movement;
            let (dx, dy) = (m.jitter(max), m.jitter(max));
            let p = poly.points[i];
            poly.points[i] = m.clip(p.x + dx, p.y + dy);
        })
    }

    fn rectify_point(&mut self, parent: &Candidate) -> (Candidate, IntRect) {
        self.edit_random_polygon(parent, |m, poly| {
            let n = poly.points.len();
            let i = m.rng.gen_range(0..n);
            let prev = poly.points[(i + n - 1) % n];
            let p = &mut poly.points[i];
            if (p.x - prev.x).abs() < (p.y - prev.y).abs() {
                p.x = prev.x;
            } else {
                p.y = prev.y;
            }
        })
    }

    fn reorder_poly(&mut self, parent: &Candidate) -> Option<(Candidate, IntRect)> {
        let n = parent.len();
        if n < 3 {
            return None;
        }
        let from = self.rng.gen_range(0..n);
        let mut to = self.rng.gen_range(0..n - 1);
        if to >= from {
            to += 1;
        }
        let mut child = parent.clone();
        let moved = child.polygons.remove(from);
        let region = self.bbox(&moved);
        child.polygons.insert(to.min(n - 1), moved);
        Some((child, region))
    }

    /// Pull every vertex toward the bounds center (`shrink`) or push it away.
    fn scale_poly(&mut self, parent: &Candidate, shrink: bool) -> (Candidate, IntRect) {
        self.edit_random_polygon(parent, |m, poly| {
            let (cx, cy) = poly.bounds_center();
            let max = m.max_point_movement.max(0);
            for i in 0..poly.points.len() {
                let p = poly.points[i];
                let step_x = m.rng.gen_range(0..=max);
                let step_y = m.rng.gen_range(0..=max);
                let (nx, ny) = if shrink {
                    (
                        p.x + (cx - p.x).signum() * step_x.min((cx - p.x).abs()),
                        p.y + (cy - p.y).signum() * step_y.min((cy - p.y).abs()),
                    )
                } else {
                    (p.x - (cx - p.x).signum() * step_x, p.y - (cy - p.y).signum() * step_y)
                };
                poly.points[i] = m.clip(nx, ny);
            }
        })
    }

    fn shift_poly(&mut self, parent: &Candidate) -> (Candidate, IntRect) {
        self.edit_random_polygon(parent, |m, poly| {
            let max = m.max_point_movement;
            let (dx, dy) = (m.jitter(max), m.jitter(max));
            for i in 0..poly.points.len() {
                let p = poly.points[i];
                poly.points[i] = m.clip(p.x + dx, p.y + dy);
            }
        })
    }

    fn change_color(&mut self, parent: &Candidate) -> (Candidate, IntRect) {
        self.edit_random_polygon(parent, |m, poly| {
            let ch = m.rng.gen_range(0..3);
            let delta = m.jitter(m.max_color_change);
            poly.color[ch] = (poly.color[ch] as i32 + delta).clamp(0, 255) as u8;
        })
    }

    fn change_alpha(&mut self, parent: &Candidate) -> (Candidate, IntRect) {
        self.edit_random_polygon(parent, |m, poly| {
            poly.alpha = m.rng.gen::<f32>();
        })
    }

    fn solid(&mut self, parent: &Candidate, color: [u8; 3]) -> (Candidate, IntRect) {
        self.edit_random_polygon(parent, |_, poly| {
            poly.color = color;
            poly.alpha = 1.0;
        })
    }

    /// Take polygon `i` of a donor into slot `i`, or append it if the child is shorter.
    fn breed<S: MemberSource + ?Sized>(
        &mut self,
        parent: &Candidate,
        pool: &S,
        elite_only: bool,
    ) -> Option<(Candidate, IntRect)> {
        let donor = pool.random_member(elite_only)?;
        let donor = &donor.candidate;
        if donor.is_empty() {
            return None;
        }
        let idx = self.rng.gen_range(0..donor.len());
        let gene = Arc::clone(&donor.polygons[idx]);
        let new_box = self.bbox(&gene);

        let mut child = parent.clone();
        if idx < child.len() {
            let region = union_rect(&self.bbox(&child.polygons[idx]), &new_box);
            child.polygons[idx] = gene;
            Some((child, region))
        } else if child.len() < self.max_polygons {
            child.polygons.push(gene);
            Some((child, new_box))
        } else {
            None
        }
    }

    /// Replace one polygon wholesale; also the fallback for failed preconditions.
    fn complete_change(&mut self, parent: &Candidate) -> (Candidate, IntRect) {
        if parent.is_empty() {
            let m = self.grow_from_nothing(parent.clone());
            return (m.candidate, m.changed_region);
        }
        let idx = self.rng.gen_range(0..parent.len());
        let poly = self.random_polygon();
        self.replace_at(parent, idx, poly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::raster::render_candidate;
    use crate::engine::{FitnessEvaluator, Score};

    struct FixedPool(Option<Arc<GenerationMember>>);

    impl MemberSource for FixedPool {
        fn random_member(&self, _elite_only: bool) -> Option<Arc<GenerationMember>> {
            self.0.clone()
        }
    }

    fn dims() -> FrameDimensions {
        FrameDimensions { width: 48, height: 36 }
    }

    fn settings() -> Settings {
        Settings { max_polygons: 12, max_points: 6, ..Settings::default() }
    }

    fn mutator(seed: u64) -> Mutator {
        Mutator::new(&settings(), dims(), PcgRng::seed_from_u64(seed))
    }

    fn random_candidate(m: &mut Mutator, n: usize) -> Candidate {
        Candidate::new((0..n).map(|_| m.random_polygon()).collect())
    }

    fn donor_pool(m: &mut Mutator, n: usize) -> FixedPool {
        let cand = random_candidate(m, n);
        FixedPool(Some(Arc::new(GenerationMember::new(Score::worst(), cand))))
    }

    fn gradient_target(d: FrameDimensions) -> Vec<u8> {
        let mut buf = vec![255u8; d.buffer_len()];
        for y in 0..d.height {
            for x in 0..d.width {
                let i = (y * d.width + x) * 4;
                buf[i + 1] = (x * 5) as u8;
                buf[i + 2] = (y * 7) as u8;
                buf[i + 3] = ((x + y) * 3) as u8;
            }
        }
        buf
    }

    fn assert_well_formed(cand: &Candidate, max_points: usize) {
        let d = dims();
        for poly in cand.polygons() {
            assert!((3..=max_points).contains(&poly.points().len()));
            for p in poly.points() {
                assert!(p.x >= 0 && p.x <= d.width as i32);
                assert!(p.y >= 0 && p.y <= d.height as i32);
            }
            assert!((0.0..=1.0).contains(&poly.alpha()));
        }
    }

    #[test]
    fn test_empty_parent_only_grows() {
        let mut m = mutator(1);
        let pool = FixedPool(None);
        let a = m.improve(None, &pool);
        assert_eq!(a.operator, MutationOperator::AddPolygon);
        assert_eq!(a.candidate.len(), 1);

        let b = m.improve(Some(&Candidate::default()), &pool);
        assert_eq!(b.operator, MutationOperator::AddPolygon);
        assert_eq!(b.candidate.len(), 1);
    }

    #[test]
    fn test_every_operator_region_is_sound() {
        let d = dims();
        let eval = FitnessEvaluator::new(gradient_target(d), d).unwrap();
        let mut m = mutator(42);
        let pool = donor_pool(&mut m, 8);
        let mut parent_buf = vec![0u8; d.buffer_len()];
        let mut child_buf = vec![0u8; d.buffer_len()];

        for op in MutationOperator::ALL {
            for round in 0..40 {
                let parent = random_candidate(&mut m, 3 + round % 6);
                render_candidate(&parent, d, &mut parent_buf);
                let prev = eval.score(&parent_buf, None, None).unwrap();

                let (child, region) = match m.apply_operator(op, &parent, &pool) {
                    Some(result) => result,
                    None => continue,
                };
                assert_well_formed(&child, 6);
                render_candidate(&child, d, &mut child_buf);
                let incremental = eval.score(&child_buf, Some(&prev), Some(&region)).unwrap();
                let full = eval.score(&child_buf, None, None).unwrap();
                assert_eq!(incremental.total(), full.total(), "{} round {}", op.label(), round);
            }
        }
    }

    #[test]
    fn test_improve_region_is_sound_over_a_lineage() {
        let d = dims();
        let eval = FitnessEvaluator::new(gradient_target(d), d).unwrap();
        let mut m = mutator(7);
        let pool = donor_pool(&mut m, 5);
        let mut buf = vec![0u8; d.buffer_len()];

        let mut current = Candidate::default();
        render_candidate(&current, d, &mut buf);
        let mut score = eval.score(&buf, None, None).unwrap();
        for _ in 0..300 {
            let mutation = m.improve(Some(&current), &pool);
            render_candidate(&mutation.candidate, d, &mut buf);
            let next = eval.score(&buf, Some(&score), Some(&mutation.changed_region)).unwrap();
            assert_eq!(next.cells(), eval.score(&buf, None, None).unwrap().cells());
            m.record_outcome(mutation.operator, next < score);
            current = mutation.candidate;
            score = next;
        }
        assert_well_formed(&current, 6);
        assert!(current.len() <= 12);
    }

    #[test]
    fn test_add_polygon_at_cap_falls_back() {
        let mut m = mutator(3);
        let full = random_candidate(&mut m, 12);
        assert!(m.apply_operator(MutationOperator::AddPolygon, &full, &FixedPool(None)).is_none());
    }

    #[test]
    fn test_point_bounds_fall_back() {
        let mut m = mutator(4);
        let tri = Polygon::new(
            vec![Point::new(1, 1), Point::new(9, 1), Point::new(5, 8)],
            [1, 2, 3],
            0.4,
        );
        let cand = Candidate::new(vec![tri]);
        assert!(m.apply_operator(MutationOperator::RemovePoint, &cand, &FixedPool(None)).is_none());

        let hexagon = Polygon::new((0..6).map(|i| Point::new(i * 3, i * 2)).collect(), [0, 0, 0], 1.0);
        let cand = Candidate::new(vec![hexagon]);
        assert!(m.apply_operator(MutationOperator::AddPoint, &cand, &FixedPool(None)).is_none());
        let (child, _) = m.apply_operator(MutationOperator::RemovePoint, &cand, &FixedPool(None)).unwrap();
        assert_eq!(child.polygons[0].points.len(), 5);
    }

    #[test]
    fn test_reorder_needs_three_polygons() {
        let mut m = mutator(5);
        let two = random_candidate(&mut m, 2);
        assert!(m.apply_operator(MutationOperator::ReorderPoly, &two, &FixedPool(None)).is_none());

        let three = random_candidate(&mut m, 3);
        let (child, _) = m.apply_operator(MutationOperator::ReorderPoly, &three, &FixedPool(None)).unwrap();
        assert_eq!(child.len(), 3);
        let moved = (0..3).any(|i| !Arc::ptr_eq(&child.polygons[i], &three.polygons[i]));
        assert!(moved);
    }

    #[test]
    fn test_breed_without_donor_falls_back() {
        let mut m = mutator(6);
        let cand = random_candidate(&mut m, 2);
        assert!(m.apply_operator(MutationOperator::Breed, &cand, &FixedPool(None)).is_none());
        let empty = FixedPool(Some(Arc::new(GenerationMember::new(Score::worst(), Candidate::default()))));
        assert!(m.apply_operator(MutationOperator::BreedElite, &cand, &empty).is_none());
    }

    #[test]
    fn test_breed_copies_donor_gene() {
        let mut m = mutator(8);
        let pool = donor_pool(&mut m, 4);
        let donor = pool.0.clone().unwrap();
        let cand = random_candidate(&mut m, 1);
        for _ in 0..20 {
            let (child, _) = m.apply_operator(MutationOperator::Breed, &cand, &pool).unwrap();
            let from_donor = child
                .polygons
                .iter()
                .any(|p| donor.candidate.polygons.iter().any(|d| Arc::ptr_eq(p, d)));
            assert!(from_donor);
            assert!(child.len() == 1 || child.len() == 2);
        }
    }

    #[test]
    fn test_white_and_black_are_opaque() {
        let mut m = mutator(9);
        let cand = random_candidate(&mut m, 1);
        let before = cand.to_polygons();
        let (w, _) = m.apply_operator(MutationOperator::White, &cand, &FixedPool(None)).unwrap();
        assert_eq!(w.polygons[0].color, [255, 255, 255]);
        assert_eq!(w.polygons[0].alpha, 1.0);
        let (b, _) = m.apply_operator(MutationOperator::Black, &cand, &FixedPool(None)).unwrap();
        assert_eq!(b.polygons[0].color, [0, 0, 0]);
        // the parent is untouched
        assert_eq!(cand.to_polygons(), before);
    }

    #[test]
    fn test_rectify_snaps_smaller_axis() {
        let mut m = mutator(10);
        let tri = Polygon::new(
            vec![Point::new(10, 10), Point::new(30, 12), Point::new(11, 30)],
            [9, 9, 9],
            0.7,
        );
        let cand = Candidate::new(vec![tri]);
        for _ in 0..20 {
            let (child, _) = m.apply_operator(MutationOperator::RectifyPoint, &cand, &FixedPool(None)).unwrap();
            let pts = &child.polygons[0].points;
            let changed: Vec<usize> = (0..3).filter(|&i| pts[i] != cand.polygons[0].points[i]).collect();
            for i in changed {
                let prev = pts[(i + 2) % 3];
                assert!(pts[i].x == prev.x || pts[i].y == prev.y);
            }
        }
    }

    #[test]
    fn test_improve_records_failed_precondition() {
        let mut m = mutator(11);
        let pool = FixedPool(None);
        let single = random_candidate(&mut m, 1);
        for _ in 0..200 {
            let mutation = m.improve(Some(&single), &pool);
            // breed ops can never succeed without donors
            assert_ne!(mutation.operator, MutationOperator::Breed);
            assert_ne!(mutation.operator, MutationOperator::BreedElite);
            assert_ne!(mutation.operator, MutationOperator::ReorderPoly);
        }
    }
}
