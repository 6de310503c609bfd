//! Search orchestrator.
//!
//! Runs a pool of worker threads over one shared population. Each worker owns
//! its mutator and canvas; only population bookkeeping happens under the lock.
//! Rendering and scoring run outside it. New bests are fanned out to
//! subscribers as rendered images.

use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        mpsc::{self, Receiver, SyncSender, TrySendError},
        Arc,
    },
    thread,
    time::Duration,
};

use parking_lot::Mutex;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg as PcgRng;

use super::mutation::{MemberSource, Mutator};
use super::population::{GenerationMember, Population};
use super::raster::crossfade;
use super::{
    clamp_i32, render_candidate, Candidate, EvolutionStats, FitnessEvaluator, FrameDimensions,
    ImprovementResult, MutationOperator, Point, Polygon, Score,
};
use crate::error::{FitnessError, SearchError};
use crate::settings::Settings;

/// Frames a subscriber may have queued before newer ones are dropped for it.
pub const EVENT_BUFFER: usize = 32;

const WAIT_POLL: Duration = Duration::from_millis(10);

// -----------------------------------------------------------------------------
// Events
// -----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageKind {
    /// Rendering of a new best candidate.
    Best { score: u64 },
    /// One frame of the terminal blend toward the target.
    Crossfade { step: usize, steps: usize },
}

/// A rendered image pushed to subscribers. Pixels use the engine layout:
/// 4 bytes per pixel, alpha (ignored) then blue, green, red.
#[derive(Clone, Debug)]
pub struct ImageGenerated {
    pub kind: ImageKind,
    pub dims: FrameDimensions,
    pub pixels: Arc<[u8]>,
}

// -----------------------------------------------------------------------------
// Shared state
// -----------------------------------------------------------------------------

struct Shared {
    evaluator: FitnessEvaluator,
    settings: Settings,
    population: Mutex<Population>,
    listeners: Mutex<Vec<SyncSender<ImageGenerated>>>,

    total_proposals: AtomicU64,
    total_bests: AtomicU64,
    total_elites: AtomicU64,

    // best history, operator weights, last published score
    progress: Mutex<EvolutionStats>,
}

impl Shared {
    fn dims(&self) -> FrameDimensions {
        self.evaluator.dimensions()
    }

    /// Never blocks: a subscriber with a full queue misses this frame, a
    /// disconnected one is removed.
    fn publish(&self, event: ImageGenerated) {
        let mut listeners = self.listeners.lock();
        listeners.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) | Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Disconnected(_)) => false,
        });
    }

    /// Generation-zero elite: single random polygons, scored from scratch.
    fn seed(&self, rng: &mut PcgRng) -> Result<(), FitnessError> {
        let dims = self.dims();
        let rng = PcgRng::from_rng(rng).unwrap_or_else(|_| PcgRng::from_entropy());
        let mut mutator = Mutator::new(&self.settings, dims, rng);
        let mut canvas = vec![0u8; dims.buffer_len()];
        for _ in 0..self.settings.elite_size.max(1) {
            let candidate = Candidate::new(vec![mutator.random_polygon()]);
            render_candidate(&candidate, dims, &mut canvas);
            let score = self.evaluator.score(&canvas, None, None)?;
            let total = score.total();
            if self.population.lock().insert(score, candidate) == ImprovementResult::Best {
                self.progress.lock().push_best_error_history(total);
            }
        }
        Ok(())
    }
}

impl MemberSource for Shared {
    fn random_member(&self, elite_only: bool) -> Option<Arc<GenerationMember>> {
        self.population.lock().random_member(elite_only)
    }
}

// -----------------------------------------------------------------------------
// Control state (second lock: start / stop / complete never race)
// -----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Idle,
    Searching,
    Completing,
}

struct Control {
    mode: Mode,
    stop: Arc<AtomicBool>,
    handles: Vec<thread::JoinHandle<()>>,
}

impl Control {
    /// Signal every thread and wait for each to leave its loop.
    fn halt(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::error!("worker thread panicked");
            }
        }
        self.mode = Mode::Idle;
    }

    /// A crossfade that has emitted its last frame leaves the engine idle.
    /// Returns true once the mode is no longer `Completing`.
    fn reap(&mut self) -> bool {
        if self.mode != Mode::Completing {
            return true;
        }
        if !self.handles.iter().all(|h| h.is_finished()) {
            return false;
        }
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                log::error!("completer thread panicked");
            }
        }
        self.mode = Mode::Idle;
        true
    }
}

// -----------------------------------------------------------------------------
// Public engine API
// -----------------------------------------------------------------------------

pub struct SearchEngine {
    shared: Arc<Shared>,
    control: Mutex<Control>,
}

impl SearchEngine {
    /// Build an idle engine for `target` (engine pixel layout, `dims` sized).
    pub fn new(target: Vec<u8>, dims: FrameDimensions, settings: Settings) -> Result<Self, FitnessError> {
        let evaluator = FitnessEvaluator::new(target, dims)?;
        let population = Population::new(&settings, dims, PcgRng::from_entropy());
        let shared = Shared {
            evaluator,
            settings,
            population: Mutex::new(population),
            listeners: Mutex::new(Vec::new()),
            total_proposals: AtomicU64::new(0),
            total_bests: AtomicU64::new(0),
            total_elites: AtomicU64::new(0),
            progress: Mutex::new(EvolutionStats::default()),
        };
        Ok(Self {
            shared: Arc::new(shared),
            control: Mutex::new(Control {
                mode: Mode::Idle,
                stop: Arc::new(AtomicBool::new(false)),
                handles: Vec::new(),
            }),
        })
    }

    fn worker_count(&self) -> usize {
        self.shared.settings.worker_threads.unwrap_or_else(|| {
            thread::available_parallelism().map(|n| n.get()).unwrap_or(1) + 1
        })
    }

    /// Spawn the worker pool. No-op while already searching; a running
    /// crossfade is cancelled first.
    pub fn start(&self) -> Result<(), SearchError> {
        let mut control = self.control.lock();
        match control.mode {
            Mode::Searching => return Ok(()),
            Mode::Completing => control.halt(),
            Mode::Idle => {}
        }

        let mut seed_rng = PcgRng::from_entropy();
        if !self.shared.population.lock().has_best() {
            self.shared.seed(&mut seed_rng)?;
        }

        let stop = Arc::new(AtomicBool::new(false));
        control.stop = Arc::clone(&stop);
        control.mode = Mode::Searching;

        let count = self.worker_count();
        for i in 0..count {
            let shared = Arc::clone(&self.shared);
            let stop = Arc::clone(&stop);
            let rng = PcgRng::from_rng(&mut seed_rng).unwrap_or_else(|_| PcgRng::from_entropy());
            let spawned = thread::Builder::new()
                .name(format!("polycasso-worker-{i}"))
                .spawn(move || run_worker(shared, stop, rng));
            match spawned {
                Ok(handle) => control.handles.push(handle),
                Err(e) => {
                    control.halt();
                    return Err(SearchError::Spawn(e));
                }
            }
        }

        log::info!(
            "search started: {} workers on a {}x{} target",
            count,
            self.shared.dims().width,
            self.shared.dims().height
        );
        Ok(())
    }

    /// Stop the workers (or a running crossfade) and join them.
    pub fn stop(&self) {
        let mut control = self.control.lock();
        if control.mode == Mode::Idle && control.handles.is_empty() {
            return;
        }
        control.halt();
        log::info!("search stopped, best {}", self.shared.population.lock().best().score().total());
    }

    /// Stop searching and blend the best rendering into the target over
    /// `completion_steps` frames. Does nothing before the first best exists.
    pub fn complete(&self) -> Result<(), SearchError> {
        let mut control = self.control.lock();
        control.halt();

        let best = {
            let population = self.shared.population.lock();
            if !population.has_best() {
                return Ok(());
            }
            Arc::clone(population.best())
        };

        let stop = Arc::new(AtomicBool::new(false));
        control.stop = Arc::clone(&stop);

        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("polycasso-completer".to_string())
            .spawn(move || run_completer(shared, stop, best))?;
        control.handles.push(handle);
        control.mode = Mode::Completing;

        log::info!(
            "completing over {} steps of {} ms",
            self.shared.settings.completion_steps,
            self.shared.settings.completion_delay_ms
        );
        Ok(())
    }

    /// Block until a running crossfade has emitted its last frame, or until
    /// another thread stops or restarts the engine. Returns immediately when
    /// not completing. The control lock is only held between polls.
    pub fn wait_for_completion(&self) {
        while !self.control.lock().reap() {
            thread::sleep(WAIT_POLL);
        }
    }

    /// Register a new listener for rendered images. Each subscriber gets its
    /// own queue of [`EVENT_BUFFER`] frames; frames published while it is full
    /// are dropped for that subscriber only.
    pub fn subscribe(&self) -> Receiver<ImageGenerated> {
        let (tx, rx) = mpsc::sync_channel(EVENT_BUFFER);
        self.shared.listeners.lock().push(tx);
        rx
    }

    pub fn is_running(&self) -> bool {
        let mut control = self.control.lock();
        control.reap();
        control.mode != Mode::Idle
    }

    /// Offer `candidate` to the population as if a worker had found it, for
    /// example to resume from a saved snapshot. Polygons with too few or too
    /// many vertices are dropped, vertices are clipped to the canvas and the
    /// list is cut to `max_polygons`.
    pub fn seed_candidate(&self, candidate: &Candidate) -> Result<ImprovementResult, FitnessError> {
        let dims = self.shared.dims();
        let settings = &self.shared.settings;
        let (w, h) = (dims.width as i32, dims.height as i32);

        let polygons: Vec<Polygon> = candidate
            .polygons()
            .filter(|p| (3..=settings.max_points.max(3)).contains(&p.points().len()))
            .take(settings.max_polygons)
            .map(|p| {
                let points = p
                    .points()
                    .iter()
                    .map(|pt| Point::new(clamp_i32(pt.x, 0, w), clamp_i32(pt.y, 0, h)))
                    .collect();
                Polygon::new(points, p.color(), p.alpha())
            })
            .collect();
        if polygons.len() < candidate.len() {
            log::warn!(
                "seed candidate: kept {} of {} polygons",
                polygons.len(),
                candidate.len()
            );
        }

        let candidate = Candidate::new(polygons);
        let mut canvas = vec![0u8; dims.buffer_len()];
        render_candidate(&candidate, dims, &mut canvas);
        let score = self.shared.evaluator.score(&canvas, None, None)?;
        let total = score.total();
        let result = self.shared.population.lock().insert(score, candidate);
        if result == ImprovementResult::Best {
            self.shared.progress.lock().push_best_error_history(total);
        }
        log::info!("seed candidate scored {total}: {result:?}");
        Ok(result)
    }

    #[inline]
    pub fn dimensions(&self) -> FrameDimensions {
        self.shared.dims()
    }

    pub fn target(&self) -> &[u8] {
        self.shared.evaluator.target()
    }

    /// Polygons of the best candidate so far (empty before the first start).
    pub fn best_data(&self) -> Candidate {
        self.shared.population.lock().best().candidate().clone()
    }

    pub fn best_score(&self) -> Option<Score> {
        let population = self.shared.population.lock();
        population.has_best().then(|| population.best().score().clone())
    }

    /// Render the best candidate into a fresh buffer.
    pub fn best_image(&self) -> Vec<u8> {
        let best = self.best_data();
        let dims = self.shared.dims();
        let mut out = vec![0u8; dims.buffer_len()];
        render_candidate(&best, dims, &mut out);
        out
    }

    pub fn stats(&self) -> EvolutionStats {
        let mut stats = self.shared.progress.lock().clone();
        {
            let population = self.shared.population.lock();
            stats.generation_number = population.generation_number();
            stats.population_len = population.len();
            stats.anneal_temp = population.annealing_value();
            stats.elite_cutoff = Some(population.elite_cutoff()).filter(|&c| c != u64::MAX);
            if population.has_best() {
                stats.best_error = Some(population.best().score().total());
                stats.best_polygon_count = population.best().candidate().len();
            }
        }
        stats.total_proposals = self.shared.total_proposals.load(Ordering::Relaxed);
        stats.total_bests = self.shared.total_bests.load(Ordering::Relaxed);
        stats.total_elites = self.shared.total_elites.load(Ordering::Relaxed);

        let mut control = self.control.lock();
        control.reap();
        stats.running = control.mode != Mode::Idle;
        stats.worker_count = match control.mode {
            Mode::Searching => control.handles.len(),
            Mode::Idle | Mode::Completing => 0,
        };
        stats
    }
}

impl Drop for SearchEngine {
    fn drop(&mut self) {
        self.control.get_mut().halt();
    }
}

// -----------------------------------------------------------------------------
// Worker loops
// -----------------------------------------------------------------------------

fn run_worker(shared: Arc<Shared>, stop: Arc<AtomicBool>, rng: PcgRng) {
    let dims = shared.dims();
    let mut mutator = Mutator::new(&shared.settings, dims, rng);
    let mut canvas = vec![0u8; dims.buffer_len()];

    while !stop.load(Ordering::Relaxed) {
        let parent = shared.population.lock().random_member(false);
        let mutation = mutator.improve(parent.as_deref().map(GenerationMember::candidate), &*shared);

        render_candidate(&mutation.candidate, dims, &mut canvas);
        let score = match shared.evaluator.score(
            &canvas,
            parent.as_deref().map(GenerationMember::score),
            Some(&mutation.changed_region),
        ) {
            Ok(score) => score,
            Err(e) => {
                log::error!("{}: scoring failed, worker exiting: {e}", worker_name());
                break;
            }
        };

        let total = score.total();
        let result = shared.population.lock().insert(score, mutation.candidate);
        shared.total_proposals.fetch_add(1, Ordering::Relaxed);

        match result {
            ImprovementResult::Best => {
                shared.total_bests.fetch_add(1, Ordering::Relaxed);
                publish_best(&shared, &mutator, &canvas, total);
            }
            ImprovementResult::Elite => {
                shared.total_elites.fetch_add(1, Ordering::Relaxed);
            }
            ImprovementResult::Fail => {}
        }

        mutator.record_outcome(mutation.operator, result != ImprovementResult::Fail);
    }
}

/// Workers race to publish; only a strictly better image than the last one
/// sent goes out.
fn publish_best(shared: &Shared, mutator: &Mutator, canvas: &[u8], total: u64) {
    {
        let mut progress = shared.progress.lock();
        if progress.error_history.last().is_some_and(|&last| total >= last) {
            return;
        }
        progress.push_best_error_history(total);

        let scheduler = mutator.scheduler();
        progress.operator_weights = MutationOperator::ALL
            .iter()
            .zip(scheduler.current_weights())
            .map(|(op, w)| (op.label().to_string(), w))
            .collect();
        progress.scheduler_resets = scheduler.resets();
    }

    shared.publish(ImageGenerated {
        kind: ImageKind::Best { score: total },
        dims: shared.dims(),
        pixels: Arc::from(canvas),
    });
}

fn run_completer(shared: Arc<Shared>, stop: Arc<AtomicBool>, best: Arc<GenerationMember>) {
    let dims = shared.dims();
    let steps = shared.settings.completion_steps.max(1);
    let delay = Duration::from_millis(shared.settings.completion_delay_ms);

    let mut from = vec![0u8; dims.buffer_len()];
    render_candidate(best.candidate(), dims, &mut from);
    let mut frame = vec![0u8; dims.buffer_len()];

    for step in 1..=steps {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        if stop.load(Ordering::Relaxed) {
            log::debug!("crossfade cancelled at step {step}/{steps}");
            return;
        }
        crossfade(&from, shared.evaluator.target(), step, steps, &mut frame);
        shared.publish(ImageGenerated {
            kind: ImageKind::Crossfade { step, steps },
            dims,
            pixels: Arc::from(frame.as_slice()),
        });
    }
    log::info!("crossfade finished after {steps} steps");
}

fn worker_name() -> String {
    thread::current().name().unwrap_or("worker").to_string()
}
