use std::mem;

use tracing::{debug, error, info, warn};

use mandelzoom_core::{
    determine_resolution, Complex, CoordinateMapper, EscapeEvaluator, PixelPoint, PixelSize,
    PlaneRect, PlotGrid, Real,
};
use mandelzoom_render::{draw_grid, Canvas, EscapeStats, Palette, Rgb};

use crate::config::PlotConfig;
use crate::input::{Event, InputSource, Key, MouseButton};
use crate::selection::ZoomSelection;
use crate::worker::EscapeWorker;

/// Color of the outline drawn around a freshly committed zoom rectangle.
const OUTLINE_COLOR: Rgb = Rgb::WHITE;

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Where the recompute pipeline currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlotPhase {
    /// Bounds or resolution changed; the grid must be rebuilt.
    NeedsPoints,
    /// The grid is fresh but untimed, or its pass is running.
    NeedsEscapeCalc,
    /// Every sample is timed; the frame has not been drawn.
    NeedsDraw,
    /// The frame on screen is current.
    Idle,
    /// Quit was requested; no further phases run.
    Terminated,
}

impl PlotPhase {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::NeedsPoints => "Generating points\u{2026}",
            Self::NeedsEscapeCalc => "Computing\u{2026}",
            Self::NeedsDraw => "Drawing\u{2026}",
            Self::Idle => "Idle",
            Self::Terminated => "Terminated",
        }
    }
}

// ---------------------------------------------------------------------------
// Plot state
// ---------------------------------------------------------------------------

/// The plot's mutable state. Owned by [`PlotController`] and only changed
/// between phases.
#[derive(Debug, Clone)]
struct PlotState<R> {
    rect: PlaneRect<R>,
    resolution: R,
    evaluator: EscapeEvaluator,
    grid: PlotGrid<R>,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Drives the points → escape times → draw → idle pipeline and the
/// click-to-zoom gesture.
///
/// Every phase handler is a no-op unless the controller is in exactly the
/// phase it handles, so [`tick`](Self::tick) can be called every frame.
pub(crate) struct PlotController<R: Real> {
    state: PlotState<R>,
    phase: PlotPhase,
    size: PixelSize,
    selection: ZoomSelection<R>,
    palette: Palette,
    cap_limit: Option<u32>,
    worker: EscapeWorker<R>,
    /// Selection outline (old-view pixels) still to be shown.
    pending_outline: Option<(PixelPoint, PixelPoint)>,
    last_stats: Option<EscapeStats>,
    zoom_count: u32,
}

impl<R: Real> PlotController<R> {
    /// `rect` must have non-zero extent on both axes, fine enough to step at
    /// the resolution `size` implies.
    pub(crate) fn new(
        rect: PlaneRect<R>,
        size: PixelSize,
        evaluator: EscapeEvaluator,
        palette: Palette,
    ) -> mandelzoom_core::Result<Self> {
        rect.ensure_non_degenerate()?;
        let resolution = determine_resolution(&rect, size);
        rect.ensure_steppable(resolution)?;
        Ok(Self {
            state: PlotState {
                rect,
                resolution,
                evaluator,
                grid: PlotGrid::default(),
            },
            phase: PlotPhase::NeedsPoints,
            size,
            selection: ZoomSelection::new(),
            palette,
            cap_limit: None,
            worker: EscapeWorker::spawn(),
            pending_outline: None,
            last_stats: None,
            zoom_count: 0,
        })
    }

    pub(crate) fn from_config(config: &PlotConfig) -> mandelzoom_core::Result<Self> {
        let controller = Self::new(
            config.plane_rect(),
            config.pixel_size()?,
            config.evaluator()?,
            config.palette.to_palette(),
        )?;
        Ok(controller.with_cap_limit(config.iteration_cap_limit))
    }

    pub(crate) fn with_cap_limit(mut self, limit: Option<u32>) -> Self {
        self.cap_limit = limit;
        self
    }

    // -- Accessors ------------------------------------------------------------

    pub(crate) fn phase(&self) -> PlotPhase {
        self.phase
    }

    pub(crate) fn rect(&self) -> &PlaneRect<R> {
        &self.state.rect
    }

    pub(crate) fn resolution(&self) -> R {
        self.state.resolution
    }

    pub(crate) fn cap(&self) -> u32 {
        self.state.evaluator.cap()
    }

    pub(crate) fn grid(&self) -> &PlotGrid<R> {
        &self.state.grid
    }

    pub(crate) fn size(&self) -> PixelSize {
        self.size
    }

    pub(crate) fn selection(&self) -> &ZoomSelection<R> {
        &self.selection
    }

    pub(crate) fn last_stats(&self) -> Option<&EscapeStats> {
        self.last_stats.as_ref()
    }

    pub(crate) fn zoom_count(&self) -> u32 {
        self.zoom_count
    }

    /// `(done, total)` samples of the latest escape-time pass.
    pub(crate) fn progress(&self) -> (usize, usize) {
        self.worker.progress()
    }

    pub(crate) fn mapper(&self) -> CoordinateMapper<R> {
        CoordinateMapper::new(self.state.rect, self.size)
    }

    /// Plane coordinate under a viewport pixel in the current view.
    pub(crate) fn plane_at(&self, p: PixelPoint) -> Complex<R> {
        self.mapper().pixel_to_plane(p)
    }

    // -- Control loop ---------------------------------------------------------

    /// One pass of the control loop: ingest input, then advance the pipeline
    /// as far as it goes and draw if a new frame is ready.
    ///
    /// A freshly committed selection is outlined and presented on its own
    /// pass; recomputation starts on the next one so the outline gets shown.
    /// The escape-time pass runs on the worker, so a tick never waits for it.
    pub(crate) fn tick<I, C>(&mut self, input: &mut I, canvas: &mut C) -> PlotPhase
    where
        I: InputSource + ?Sized,
        C: Canvas + ?Sized,
    {
        self.handle_input(input);
        if self.phase == PlotPhase::Terminated {
            return self.phase;
        }

        if let Some((a, b)) = self.pending_outline.take() {
            canvas.draw_rect_outline(a, b, OUTLINE_COLOR);
            canvas.present();
            return self.phase;
        }

        self.update_plot();
        self.draw(canvas);
        self.phase
    }

    /// Drive the loop until terminated, waiting out each escape-time pass
    /// before the next batch of input.
    #[cfg(test)]
    pub(crate) fn run<I, C>(&mut self, input: &mut I, canvas: &mut C)
    where
        I: InputSource + ?Sized,
        C: Canvas + ?Sized,
    {
        info!(
            width = self.size.width,
            height = self.size.height,
            cap = self.cap(),
            "Plot loop started"
        );
        while self.tick(input, canvas) != PlotPhase::Terminated {
            self.finish_escape_pass();
            self.draw(canvas);
        }
        info!(zooms = self.zoom_count, "Plot loop finished");
    }

    /// Poll the worker until the pending escape-time pass lands.
    #[cfg(test)]
    pub(crate) fn finish_escape_pass(&mut self) {
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(30);
        while self.phase == PlotPhase::NeedsEscapeCalc {
            assert!(std::time::Instant::now() < deadline, "escape-time pass hung");
            self.calculate_escape_times();
            std::thread::sleep(std::time::Duration::from_millis(1));
        }
    }

    /// Drain every pending input event.
    pub(crate) fn handle_input<I: InputSource + ?Sized>(&mut self, input: &mut I) {
        while let Some(event) = input.poll_event() {
            self.handle_event(event);
        }
    }

    pub(crate) fn handle_event(&mut self, event: Event) {
        if self.phase == PlotPhase::Terminated {
            return;
        }
        match event {
            Event::Quit | Event::KeyDown { key: Key::Escape } => self.terminate(),
            Event::KeyDown { key: Key::Other } => {}
            Event::ButtonDown { button, x, y } => match button {
                MouseButton::Primary => self.select_corner(PixelPoint::new(x, y)),
                MouseButton::Secondary => {
                    if self.selection.cancel() {
                        debug!("Zoom selection cancelled");
                    }
                }
                MouseButton::Middle => {}
            },
        }
    }

    fn terminate(&mut self) {
        self.worker.cancel();
        self.selection.cancel();
        self.phase = PlotPhase::Terminated;
        info!("Quit requested");
    }

    // -- Zoom selection -------------------------------------------------------

    fn select_corner(&mut self, at: PixelPoint) {
        let corner = self.plane_at(at);
        match self.selection.click(corner) {
            None => debug!(x = at.x, y = at.y, %corner, "Zoom selection started"),
            Some((first, second)) => {
                self.commit_zoom(first, second);
            }
        }
    }

    /// Make the rectangle spanned by two plane corners the new view.
    ///
    /// Cancels any escape-time pass in flight, clears the grid, recomputes
    /// the resolution, doubles the iteration cap and restarts the pipeline.
    /// Returns `false` (leaving the view alone) if the corners share a real
    /// or imaginary coordinate, or if the new resolution is too fine for the
    /// coordinates to step.
    pub(crate) fn commit_zoom(&mut self, a: Complex<R>, b: Complex<R>) -> bool {
        let rect = PlaneRect::from_corners(a, b);
        if rect.is_degenerate() {
            warn!(%a, %b, "Ignoring zoom selection with zero extent");
            return false;
        }
        let resolution = determine_resolution(&rect, self.size);
        if !rect.can_step(resolution) {
            warn!(
                %a,
                %b,
                %resolution,
                "Ignoring zoom selection beyond coordinate precision"
            );
            return false;
        }

        let old = self.mapper();
        self.pending_outline = Some((old.plane_to_pixel(rect.min), old.plane_to_pixel(rect.max)));

        self.worker.cancel();
        self.state.rect = rect;
        self.state.grid.clear();
        self.state.resolution = resolution;
        self.state.evaluator = self.state.evaluator.doubled(self.cap_limit);
        self.phase = PlotPhase::NeedsPoints;
        self.zoom_count += 1;

        info!(
            max = %rect.max,
            min = %rect.min,
            resolution = %self.state.resolution,
            cap = self.cap(),
            zoom = self.zoom_count,
            "Zoom committed"
        );
        true
    }

    // -- Phase handlers -------------------------------------------------------

    pub(crate) fn update_plot(&mut self) {
        self.generate_points();
        self.calculate_escape_times();
    }

    /// `NeedsPoints → NeedsEscapeCalc`.
    pub(crate) fn generate_points(&mut self) {
        if self.phase != PlotPhase::NeedsPoints {
            return;
        }
        self.state.grid = PlotGrid::generate(&self.state.rect, self.state.resolution);
        debug!(
            points = self.state.grid.len(),
            resolution = %self.state.resolution,
            "Points generated"
        );
        self.phase = PlotPhase::NeedsEscapeCalc;
    }

    /// `NeedsEscapeCalc → NeedsDraw`, once every sample is timed.
    ///
    /// The first call hands the grid to the worker; later calls pick up the
    /// result when it is ready.
    pub(crate) fn calculate_escape_times(&mut self) {
        if self.phase != PlotPhase::NeedsEscapeCalc {
            return;
        }
        if !self.worker.is_busy() {
            let grid = mem::take(&mut self.state.grid);
            if let Err(e) = self.worker.submit(grid, self.state.evaluator) {
                self.fail(e);
            }
            return;
        }
        match self.worker.poll() {
            Ok(Some(done)) => {
                self.state.grid = done.grid;
                self.last_stats = Some(done.stats);
                self.phase = PlotPhase::NeedsDraw;
            }
            Ok(None) => {}
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, e: impl std::fmt::Display) {
        error!("{e}");
        self.terminate();
    }

    /// `NeedsDraw → Idle`: one draw call per sample, then present.
    pub(crate) fn draw<C: Canvas + ?Sized>(&mut self, canvas: &mut C) {
        if self.phase != PlotPhase::NeedsDraw {
            return;
        }
        let calls = draw_grid(canvas, &self.state.grid, &self.mapper(), &self.palette);
        debug!(calls, "Frame drawn");
        self.phase = PlotPhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use mandelzoom_core::{iterate, CoreError, DoubleDouble};

    // -- Test doubles ---------------------------------------------------------

    /// Feeds one batch of events per control-loop pass, then `Quit`.
    struct ScriptedInput {
        batches: VecDeque<Vec<Event>>,
        current: VecDeque<Event>,
        started: bool,
    }

    impl ScriptedInput {
        fn new(batches: Vec<Vec<Event>>) -> Self {
            Self {
                batches: batches.into(),
                current: VecDeque::new(),
                started: false,
            }
        }
    }

    impl InputSource for ScriptedInput {
        fn poll_event(&mut self) -> Option<Event> {
            if !self.started {
                self.started = true;
                self.current = self.batches.pop_front().unwrap_or_else(|| vec![Event::Quit]).into();
            }
            if let Some(event) = self.current.pop_front() {
                return Some(event);
            }
            self.started = false;
            None
        }

        fn cursor_position(&self) -> Option<PixelPoint> {
            None
        }
    }

    /// Nothing to read.
    struct NoInput;

    impl InputSource for NoInput {
        fn poll_event(&mut self) -> Option<Event> {
            None
        }

        fn cursor_position(&self) -> Option<PixelPoint> {
            None
        }
    }

    #[derive(Default)]
    struct RecordingCanvas {
        clears: usize,
        pixels: usize,
        presents: usize,
    }

    impl Canvas for RecordingCanvas {
        fn size(&self) -> PixelSize {
            PixelSize::new(100, 100).unwrap()
        }

        fn clear(&mut self) {
            self.clears += 1;
        }

        fn draw_pixel(&mut self, _x: i32, _y: i32, _color: Rgb) {
            self.pixels += 1;
        }

        fn present(&mut self) {
            self.presents += 1;
        }
    }

    fn click(button: MouseButton, x: i32, y: i32) -> Event {
        Event::ButtonDown { button, x, y }
    }

    /// Tick once, then wait out the escape-time pass and draw.
    fn render_frame<R: Real>(c: &mut PlotController<R>, canvas: &mut RecordingCanvas) -> PlotPhase {
        c.tick(&mut NoInput, canvas);
        c.finish_escape_pass();
        c.draw(canvas);
        c.phase()
    }

    /// A view 1e-13 wide at -0.75 + 0.1i: steppable at 100 px, but a 1e-15
    /// selection inside it is not in f64.
    fn narrow_rect<R: Real>() -> PlaneRect<R> {
        PlaneRect::from_corners(
            Complex::from_f64(-0.75, 0.1),
            Complex::from_f64(-0.75 + 1e-13, 0.1 + 1e-13),
        )
    }

    fn controller(cap: u32) -> PlotController<f64> {
        PlotController::new(
            PlaneRect::<f64>::default(),
            PixelSize::new(100, 100).unwrap(),
            EscapeEvaluator::new(cap).unwrap(),
            Palette::default(),
        )
        .unwrap()
    }

    // -- Construction ---------------------------------------------------------

    #[test]
    fn starts_needing_points() {
        let c = controller(100);
        assert_eq!(c.phase(), PlotPhase::NeedsPoints);
        assert!(c.grid().is_empty());
        assert!((c.resolution() - 0.02).abs() < 1e-12);
        assert_eq!(c.cap(), 100);
    }

    #[test]
    fn degenerate_initial_rect_rejected() {
        let flat = PlaneRect::from_corners(Complex::new(0.0, 0.0), Complex::new(1.0, 0.0));
        let result = PlotController::new(
            flat,
            PixelSize::new(10, 10).unwrap(),
            EscapeEvaluator::new(10).unwrap(),
            Palette::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn from_config_applies_settings() {
        let config = PlotConfig {
            width: 120,
            height: 80,
            initial_iteration_cap: 64,
            iteration_cap_limit: Some(100),
            ..PlotConfig::default()
        };
        let mut c: PlotController<f64> = PlotController::from_config(&config).unwrap();
        assert_eq!(c.size(), PixelSize::new(120, 80).unwrap());
        assert_eq!(c.cap(), 64);
        assert!(c.commit_zoom(Complex::new(-1.0, -0.5), Complex::new(0.0, 0.5)));
        assert_eq!(c.cap(), 100, "cap limit clamps the doubled cap");
    }

    // -- Pipeline -------------------------------------------------------------

    #[test]
    fn phases_advance_in_order() {
        let mut c = controller(100);
        let mut canvas = RecordingCanvas::default();

        c.generate_points();
        assert_eq!(c.phase(), PlotPhase::NeedsEscapeCalc);
        assert!((150..=151).contains(&c.grid().columns()));
        assert_eq!(c.grid().points()[0].coord, Complex::new(-2.0, -1.0));

        let len = c.grid().len();
        c.calculate_escape_times();
        assert_eq!(c.phase(), PlotPhase::NeedsEscapeCalc, "pass runs on the worker");
        assert!(c.worker.is_busy());

        c.finish_escape_pass();
        assert_eq!(c.phase(), PlotPhase::NeedsDraw);
        assert_eq!(c.grid().len(), len);
        assert!(c.grid().iter().any(|p| p.escape_time > 0));
        assert_eq!(c.progress(), (len, len));
        let stats = c.last_stats().unwrap();
        assert_eq!(stats.points, c.grid().len());

        c.draw(&mut canvas);
        assert_eq!(c.phase(), PlotPhase::Idle);
        assert_eq!(canvas.pixels, c.grid().len());
        assert_eq!(canvas.clears, 1);
        assert_eq!(canvas.presents, 1);
    }

    #[test]
    fn handlers_are_no_ops_out_of_phase() {
        let mut c = controller(100);
        let mut canvas = RecordingCanvas::default();

        // Nothing to time or draw before points exist.
        c.calculate_escape_times();
        c.draw(&mut canvas);
        assert_eq!(c.phase(), PlotPhase::NeedsPoints);
        assert_eq!(canvas.pixels, 0);

        assert_eq!(render_frame(&mut c, &mut canvas), PlotPhase::Idle);
        let len = c.grid().len();
        let first = c.grid().points()[0];

        // Idle: the points handler must not touch the grid or phase.
        c.generate_points();
        c.calculate_escape_times();
        assert_eq!(c.phase(), PlotPhase::Idle);
        assert_eq!(c.grid().len(), len);
        assert_eq!(c.grid().points()[0], first);
    }

    #[test]
    fn repeated_ticks_draw_once() {
        let mut c = controller(100);
        let mut canvas = RecordingCanvas::default();
        render_frame(&mut c, &mut canvas);
        for _ in 0..5 {
            c.tick(&mut NoInput, &mut canvas);
        }
        assert_eq!(canvas.presents, 1);
        assert_eq!(canvas.pixels, c.grid().len());
    }

    // -- Zoom -----------------------------------------------------------------

    #[test]
    fn two_primary_clicks_commit_zoom() {
        let mut c = controller(100);
        let mut canvas = RecordingCanvas::default();
        render_frame(&mut c, &mut canvas);

        c.handle_event(click(MouseButton::Primary, 25, 25));
        assert!(c.selection().is_active());
        assert_eq!(c.phase(), PlotPhase::Idle, "first click does not invalidate");

        c.handle_event(click(MouseButton::Primary, 75, 50));
        assert!(!c.selection().is_active());
        assert_eq!(c.phase(), PlotPhase::NeedsPoints);
        assert!(c.grid().is_empty(), "grid is cleared on commit");
        assert_eq!(c.cap(), 200);
        assert_eq!(c.zoom_count(), 1);

        // Pixel (25, 25) → (-1.25, 0.5); (75, 50) → (0.25, 0.0).
        let r = *c.rect();
        assert!((r.min.re + 1.25).abs() < 1e-12);
        assert!((r.max.re - 0.25).abs() < 1e-12);
        assert!((r.min.im - 0.0).abs() < 1e-12);
        assert!((r.max.im - 0.5).abs() < 1e-12);
        // min(1.5 / 100, 0.5 / 100)
        assert!((c.resolution() - 0.005).abs() < 1e-12);
    }

    #[test]
    fn commit_is_order_independent() {
        let a = Complex::new(-0.9, 0.3);
        let b = Complex::new(-0.6, 0.1);
        let mut c1 = controller(100);
        let mut c2 = controller(100);
        assert!(c1.commit_zoom(a, b));
        assert!(c2.commit_zoom(b, a));
        assert_eq!(c1.rect(), c2.rect());
        assert_eq!(c1.resolution(), c2.resolution());
    }

    #[test]
    fn cap_doubles_once_per_zoom() {
        let mut c = controller(500);
        let corners = [
            (Complex::new(-2.0, -1.0), Complex::new(1.0, 1.0)),
            (Complex::new(-0.8, 0.0), Complex::new(-0.7, 0.1)),
            (Complex::new(-0.75, 0.05), Complex::new(-0.7499, 0.0501)),
        ];
        let mut expected = 500;
        for (a, b) in corners {
            assert!(c.commit_zoom(a, b));
            expected *= 2;
            assert_eq!(c.cap(), expected);
        }
    }

    #[test]
    fn cap_saturates_instead_of_wrapping() {
        let mut c = controller(u32::MAX / 2 + 1);
        assert!(c.commit_zoom(Complex::new(-1.0, -1.0), Complex::new(0.0, 0.0)));
        assert_eq!(c.cap(), u32::MAX);
    }

    #[test]
    fn secondary_click_cancels_selection() {
        let mut c = controller(100);
        c.handle_event(click(MouseButton::Primary, 10, 10));
        assert!(c.selection().is_active());
        c.handle_event(click(MouseButton::Secondary, 50, 50));
        assert!(!c.selection().is_active());

        // The next primary click starts over rather than committing.
        c.handle_event(click(MouseButton::Primary, 60, 60));
        assert!(c.selection().is_active());
        assert_eq!(c.zoom_count(), 0);
        assert_eq!(c.cap(), 100);
    }

    #[test]
    fn middle_click_and_other_keys_are_ignored() {
        let mut c = controller(100);
        c.handle_event(click(MouseButton::Middle, 10, 10));
        c.handle_event(Event::KeyDown { key: Key::Other });
        assert!(!c.selection().is_active());
        assert_eq!(c.phase(), PlotPhase::NeedsPoints);
    }

    #[test]
    fn zero_extent_selection_is_rejected() {
        let mut c = controller(100);
        c.handle_event(click(MouseButton::Primary, 40, 10));
        c.handle_event(click(MouseButton::Primary, 40, 90));
        assert!(!c.selection().is_active());
        assert_eq!(c.zoom_count(), 0);
        assert_eq!(c.cap(), 100);
        assert_eq!(*c.rect(), PlaneRect::<f64>::default());
    }

    #[test]
    fn zoom_beyond_coordinate_precision_is_rejected() {
        let mut c: PlotController<f64> = PlotController::new(
            narrow_rect(),
            PixelSize::new(100, 100).unwrap(),
            EscapeEvaluator::new(100).unwrap(),
            Palette::default(),
        )
        .unwrap();
        let mut canvas = RecordingCanvas::default();
        render_frame(&mut c, &mut canvas);
        let before = *c.rect();
        let resolution = c.resolution();

        let a = Complex::new(-0.75, 0.1);
        let b = Complex::new(-0.75 + 1e-15, 0.1 + 1e-15);
        assert!(!c.commit_zoom(a, b));
        assert_eq!(*c.rect(), before);
        assert_eq!(c.resolution(), resolution);
        assert_eq!(c.cap(), 100);
        assert_eq!(c.zoom_count(), 0);
        assert_eq!(c.phase(), PlotPhase::Idle);

        // No outline is queued for a rejected selection.
        c.tick(&mut NoInput, &mut canvas);
        assert_eq!(canvas.presents, 1);
    }

    #[test]
    fn double_double_zooms_past_f64_precision() {
        let mut c: PlotController<DoubleDouble> = PlotController::new(
            narrow_rect(),
            PixelSize::new(100, 100).unwrap(),
            EscapeEvaluator::new(100).unwrap(),
            Palette::default(),
        )
        .unwrap();
        let a = Complex::from_f64(-0.75, 0.1);
        let b = Complex::from_f64(-0.75 + 1e-15, 0.1 + 1e-15);
        assert!(c.commit_zoom(a, b));
        assert_eq!(c.zoom_count(), 1);
    }

    #[test]
    fn initial_rect_beyond_coordinate_precision_rejected() {
        let rect = PlaneRect::from_corners(
            Complex::new(-0.75, 0.1),
            Complex::new(-0.75 + 1e-15, 0.1 + 1e-15),
        );
        let result = PlotController::new(
            rect,
            PixelSize::new(100, 100).unwrap(),
            EscapeEvaluator::new(100).unwrap(),
            Palette::default(),
        );
        assert!(matches!(result, Err(CoreError::BelowPrecision { .. })));
    }

    #[test]
    fn zoom_mid_pass_cancels_and_recomputes() {
        let mut c = controller(100);
        let mut canvas = RecordingCanvas::default();
        c.generate_points();
        c.calculate_escape_times();
        assert!(c.worker.is_busy());
        let gen = c.worker.generation();

        assert!(c.commit_zoom(Complex::new(-0.8, 0.0), Complex::new(-0.7, 0.1)));
        assert!(!c.worker.is_busy(), "superseded pass is forgotten");
        assert!(c.worker.generation() > gen);
        assert_eq!(c.phase(), PlotPhase::NeedsPoints);

        c.tick(&mut NoInput, &mut canvas);
        assert_eq!(render_frame(&mut c, &mut canvas), PlotPhase::Idle);
        assert!(!c.grid().is_empty());
        for p in c.grid() {
            assert!(c.rect().contains(p.coord));
            assert_eq!(p.escape_time, iterate(p.coord, 200));
        }
    }

    #[test]
    fn outline_is_presented_before_recompute() {
        let mut c = controller(100);
        let mut canvas = RecordingCanvas::default();
        render_frame(&mut c, &mut canvas);
        let drawn = canvas.pixels;

        let mut input = ScriptedInput::new(vec![vec![
            click(MouseButton::Primary, 20, 20),
            click(MouseButton::Primary, 40, 40),
        ]]);
        assert_eq!(c.tick(&mut input, &mut canvas), PlotPhase::NeedsPoints);
        assert_eq!(canvas.presents, 2, "outline is presented on its own");
        assert!(canvas.pixels > drawn);
        assert_eq!(canvas.clears, 1);

        assert_eq!(render_frame(&mut c, &mut canvas), PlotPhase::Idle);
        assert_eq!(canvas.presents, 3);
        assert_eq!(canvas.clears, 2);
    }

    // -- Termination ----------------------------------------------------------

    #[test]
    fn quit_and_escape_terminate_from_any_phase() {
        for event in [Event::Quit, Event::KeyDown { key: Key::Escape }] {
            let mut c = controller(100);
            c.handle_event(event);
            assert_eq!(c.phase(), PlotPhase::Terminated);

            let mut c = controller(100);
            c.tick(&mut NoInput, &mut RecordingCanvas::default());
            c.handle_event(click(MouseButton::Primary, 10, 10));
            c.handle_event(event);
            assert_eq!(c.phase(), PlotPhase::Terminated);
            assert!(!c.selection().is_active());
        }
    }

    #[test]
    fn quit_mid_pass_cancels_it() {
        let mut c = controller(100);
        let mut canvas = RecordingCanvas::default();
        c.generate_points();
        c.calculate_escape_times();
        assert!(c.worker.is_busy());
        let gen = c.worker.generation();

        c.handle_event(Event::Quit);
        assert_eq!(c.phase(), PlotPhase::Terminated);
        assert_eq!(c.worker.generation(), gen + 1);
        assert!(!c.worker.is_busy());

        // The cancelled pass never reaches the canvas.
        c.calculate_escape_times();
        c.draw(&mut canvas);
        assert_eq!(canvas.presents, 0);
        assert!(c.last_stats().is_none());
    }

    #[test]
    fn terminated_controller_ignores_everything() {
        let mut c = controller(100);
        let mut canvas = RecordingCanvas::default();
        c.handle_event(Event::Quit);

        c.handle_event(click(MouseButton::Primary, 10, 10));
        c.handle_event(click(MouseButton::Primary, 50, 50));
        assert_eq!(c.zoom_count(), 0);

        let mut input = ScriptedInput::new(vec![]);
        assert_eq!(c.tick(&mut input, &mut canvas), PlotPhase::Terminated);
        c.generate_points();
        c.draw(&mut canvas);
        assert!(c.grid().is_empty());
        assert_eq!(canvas.presents, 0);
    }

    #[test]
    fn run_drives_zoom_session_until_quit() {
        let mut c = controller(64);
        let mut canvas = RecordingCanvas::default();
        let mut input = ScriptedInput::new(vec![
            vec![],
            vec![
                click(MouseButton::Primary, 10, 10),
                click(MouseButton::Primary, 60, 70),
            ],
            vec![],
            vec![
                click(MouseButton::Primary, 30, 30),
                click(MouseButton::Secondary, 0, 0),
            ],
            vec![],
        ]);

        c.run(&mut input, &mut canvas);

        assert_eq!(c.phase(), PlotPhase::Terminated);
        assert_eq!(c.zoom_count(), 1);
        assert_eq!(c.cap(), 128);
        // Initial frame, outline, zoomed frame.
        assert_eq!(canvas.presents, 3);
        assert_eq!(canvas.clears, 2);
    }

    #[test]
    fn double_double_controller_zooms() {
        let rect: PlaneRect<DoubleDouble> =
            PlaneRect::from_corners(Complex::from_f64(1.0, 1.0), Complex::from_f64(-2.0, -1.0));
        let mut c = PlotController::new(
            rect,
            PixelSize::new(40, 40).unwrap(),
            EscapeEvaluator::new(50).unwrap(),
            Palette::flat(),
        )
        .unwrap();
        let mut canvas = RecordingCanvas::default();

        assert_eq!(render_frame(&mut c, &mut canvas), PlotPhase::Idle);
        assert!(c.commit_zoom(
            Complex::from_f64(-0.75, 0.1),
            Complex::from_f64(-0.74, 0.11)
        ));
        c.tick(&mut NoInput, &mut canvas);
        assert_eq!(render_frame(&mut c, &mut canvas), PlotPhase::Idle);
        assert_eq!(c.cap(), 100);
        assert!(c.grid().iter().all(|p| c.rect().contains(p.coord)));
    }
}
