use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info};

use mandelzoom_core::{CoordinateMapper, EscapeEvaluator, PlotGrid, Real};

use crate::canvas::Canvas;
use crate::palette::Palette;

/// Samples handed to one rayon task; also the granularity of cancellation.
const CHUNK_SIZE: usize = 4096;

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Tracks the current evaluation generation for cancellation and progress.
///
/// Incrementing the generation tells every chunk that has not started yet
/// to skip its work. The progress counters let the UI show how far a long
/// escape-time pass has got.
#[derive(Debug)]
pub struct RenderCancel {
    generation: AtomicU64,
    progress_done: AtomicUsize,
    progress_total: AtomicUsize,
}

impl RenderCancel {
    pub fn new() -> Self {
        Self {
            generation: AtomicU64::new(0),
            progress_done: AtomicUsize::new(0),
            progress_total: AtomicUsize::new(0),
        }
    }

    /// Cancel the current pass by advancing the generation.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Reset progress for a new pass with `total` samples.
    pub fn reset_progress(&self, total: usize) {
        self.progress_total.store(total, Ordering::Relaxed);
        self.progress_done.store(0, Ordering::Relaxed);
    }

    fn add_progress(&self, n: usize) {
        self.progress_done.fetch_add(n, Ordering::Relaxed);
    }

    /// Read the current progress as `(done, total)`.
    pub fn progress(&self) -> (usize, usize) {
        (
            self.progress_done.load(Ordering::Relaxed),
            self.progress_total.load(Ordering::Relaxed),
        )
    }
}

impl Default for RenderCancel {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Escape-time pass
// ---------------------------------------------------------------------------

/// Summary of one escape-time pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscapeStats {
    pub points: usize,
    pub escaped: usize,
    pub interior: usize,
    pub elapsed: Duration,
    /// `true` if the generation changed mid-pass and at least one chunk was
    /// skipped; those samples are left untimed.
    pub cancelled: bool,
}

/// Time every sample of `grid` in parallel, as the current generation of
/// `cancel`.
///
/// Each sample's orbit is independent, so the grid is split into chunks and
/// evaluated on the rayon pool. The call returns once every chunk has
/// finished (or been skipped because `cancel` advanced).
pub fn compute_escape_times<R: Real>(
    grid: &mut PlotGrid<R>,
    evaluator: EscapeEvaluator,
    cancel: &RenderCancel,
) -> EscapeStats {
    compute_escape_times_for(grid, evaluator, cancel, cancel.generation())
}

/// Like [`compute_escape_times`], for a pass requested at generation `gen`.
///
/// A pass queued for another thread captures the generation when it is
/// queued, so a cancel that lands before the pass starts still skips it.
pub fn compute_escape_times_for<R: Real>(
    grid: &mut PlotGrid<R>,
    evaluator: EscapeEvaluator,
    cancel: &RenderCancel,
    gen: u64,
) -> EscapeStats {
    let start = Instant::now();
    let points = grid.len();
    cancel.reset_progress(points);
    debug!(points, cap = evaluator.cap(), "Starting escape-time pass");

    let (escaped, cancelled) = grid
        .points_mut()
        .par_chunks_mut(CHUNK_SIZE)
        .map(|chunk| {
            if cancel.generation() != gen {
                return (0, true);
            }
            let mut escaped = 0;
            for p in chunk.iter_mut() {
                p.escape_time = evaluator.evaluate(p.coord);
                if p.escape_time != 0 {
                    escaped += 1;
                }
            }
            cancel.add_progress(chunk.len());
            (escaped, false)
        })
        .reduce(|| (0, false), |a, b| (a.0 + b.0, a.1 || b.1));

    let elapsed = start.elapsed();
    let interior = if cancelled { 0 } else { points - escaped };
    info!(
        elapsed_ms = elapsed.as_millis(),
        points,
        escaped,
        interior,
        cap = evaluator.cap(),
        cancelled,
        "Escape-time pass complete"
    );

    EscapeStats {
        points,
        escaped,
        interior,
        elapsed,
        cancelled,
    }
}

// ---------------------------------------------------------------------------
// Drawing
// ---------------------------------------------------------------------------

/// Clear `canvas`, draw one pixel per sample, and present the frame.
///
/// Returns the number of draw calls issued.
pub fn draw_grid<R: Real, C: Canvas + ?Sized>(
    canvas: &mut C,
    grid: &PlotGrid<R>,
    mapper: &CoordinateMapper<R>,
    palette: &Palette,
) -> usize {
    canvas.clear();
    for p in grid {
        let px = mapper.plane_to_pixel(p.coord);
        canvas.draw_pixel(px.x, px.y, palette.color_for(p.escape_time));
    }
    canvas.present();
    grid.len()
}
