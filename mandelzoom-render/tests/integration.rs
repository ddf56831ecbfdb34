use mandelzoom_core::{
    determine_resolution, Complex, CoordinateMapper, DoubleDouble, EscapeEvaluator, PixelSize,
    PlaneRect, PlotGrid,
};
use mandelzoom_render::{
    compute_escape_times, compute_escape_times_for, draw_grid, Canvas, Palette, RenderBuffer,
    RenderCancel,
};

#[test]
fn end_to_end_overview_plot() {
    let size = PixelSize::new(200, 150).unwrap();
    let rect = PlaneRect::<f64>::default();
    let mut grid = PlotGrid::generate(&rect, determine_resolution(&rect, size));
    let cancel = RenderCancel::new();

    let stats = compute_escape_times(&mut grid, EscapeEvaluator::new(256).unwrap(), &cancel);
    assert!(!stats.cancelled);
    assert!(stats.escaped > 0 && stats.interior > 0);

    let mut canvas = RenderBuffer::new(size);
    draw_grid(&mut canvas, &grid, &CoordinateMapper::new(rect, size), &Palette::default());

    let has_non_black = canvas
        .pixels
        .chunks_exact(4)
        .any(|px| px[0] > 0 || px[1] > 0 || px[2] > 0);
    assert!(has_non_black, "rendered image should contain non-black pixels");
    assert_eq!(canvas.frames_presented(), 1);
}

#[test]
fn render_determinism() {
    let size = PixelSize::new(96, 64).unwrap();
    let rect = PlaneRect::from_corners(Complex::new(-1.5, -0.5), Complex::new(-0.5, 0.5));
    let ev = EscapeEvaluator::new(400).unwrap();

    let render = || {
        let mut grid = PlotGrid::generate(&rect, determine_resolution(&rect, size));
        compute_escape_times(&mut grid, ev, &RenderCancel::new());
        let mut canvas = RenderBuffer::new(size);
        draw_grid(&mut canvas, &grid, &CoordinateMapper::new(rect, size), &Palette::banded());
        canvas.pixels
    };

    assert_eq!(render(), render(), "renders must be deterministic");
}

#[test]
fn cancel_before_pass_starts_skips_it() {
    let size = PixelSize::new(400, 300).unwrap();
    let rect = PlaneRect::<f64>::default();
    let mut grid = PlotGrid::generate(&rect, determine_resolution(&rect, size));
    let cancel = RenderCancel::new();

    // Queued at this generation, cancelled before any worker picks it up.
    let queued = cancel.generation();
    cancel.cancel();
    let ev = EscapeEvaluator::new(1000).unwrap();
    let stats = compute_escape_times_for(&mut grid, ev, &cancel, queued);

    let (done, total) = cancel.progress();
    assert!(stats.cancelled);
    assert_eq!(total, grid.len());
    assert!(done < total);
    assert_eq!(stats.interior, 0);

    // A pass at the new generation runs to completion.
    let stats = compute_escape_times(&mut grid, ev, &cancel);
    assert!(!stats.cancelled);
    assert_eq!(cancel.progress(), (grid.len(), grid.len()));
}

#[test]
fn double_double_pipeline_runs() {
    let size = PixelSize::new(48, 32).unwrap();
    let rect: PlaneRect<DoubleDouble> =
        PlaneRect::from_corners(Complex::from_f64(1.0, 1.0), Complex::from_f64(-2.0, -1.0));
    let mut grid = PlotGrid::generate(&rect, determine_resolution(&rect, size));
    let stats = compute_escape_times(&mut grid, EscapeEvaluator::new(128).unwrap(), &RenderCancel::new());
    assert!(stats.escaped > 0 && stats.interior > 0);

    let mut canvas = RenderBuffer::new(size);
    let calls = draw_grid(&mut canvas, &grid, &CoordinateMapper::new(rect, size), &Palette::flat());
    assert_eq!(calls, grid.len());
    assert_eq!(canvas.size(), size);
}
