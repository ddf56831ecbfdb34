use eframe::egui;
use tracing::{debug, info};

use mandelzoom_core::{DoubleDouble, PixelSize, Precision, Real};

use crate::config::PlotConfig;
use crate::controller::{PlotController, PlotPhase};
use crate::error::InitError;
use crate::input::InputSource;
use crate::platform::{EguiInput, TextureCanvas};

/// HUD box margin from the window corner.
const HUD_MARGIN: f32 = 8.0;
const HUD_CORNER_RADIUS: f32 = 6.0;
const HUD_ALPHA: u8 = 180;

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

/// The plot window: one controller tick per egui frame.
pub(crate) struct MandelZoomApp<R: Real> {
    controller: PlotController<R>,
    input: EguiInput,
    canvas: TextureCanvas,
    precision: Precision,
    /// Screen position of the plot image's top-left corner, from the last
    /// layout pass.
    image_origin: Option<egui::Pos2>,
    /// Whether the window has been resized to the plot at the display's scale.
    window_fitted: bool,
}

/// Logical size, in egui points, of `size` physical pixels.
fn window_points(size: PixelSize, pixels_per_point: f32) -> egui::Vec2 {
    egui::vec2(size.width as f32, size.height as f32) / pixels_per_point
}

impl<R: Real> MandelZoomApp<R> {
    pub(crate) fn new(config: &PlotConfig) -> mandelzoom_render::Result<Self> {
        let controller = PlotController::from_config(config)?;
        let canvas = TextureCanvas::new(controller.size())?;
        Ok(Self {
            controller,
            input: EguiInput::new(),
            canvas,
            precision: config.precision,
            image_origin: None,
            window_fitted: false,
        })
    }

    /// The startup size assumes one pixel per point; correct it once the
    /// display scale is known.
    fn fit_window(&mut self, ctx: &egui::Context) {
        if self.window_fitted {
            return;
        }
        self.window_fitted = true;
        let ppp = ctx.pixels_per_point();
        if ppp != 1.0 {
            let points = window_points(self.controller.size(), ppp);
            debug!(ppp, width = points.x, height = points.y, "Resizing window to plot");
            ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(points));
        }
    }

    fn show_plot(&mut self, ctx: &egui::Context) {
        let size = self.controller.size();
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                egui::ScrollArea::both().show(ui, |ui| {
                    let Some(texture) = self.canvas.texture() else {
                        return;
                    };
                    let points = window_points(size, ctx.pixels_per_point());
                    let response = ui.add(egui::Image::from_texture(
                        egui::load::SizedTexture::new(texture.id(), points),
                    ));
                    self.image_origin = Some(response.rect.min);
                });
            });
    }

    fn show_hud(&self, ctx: &egui::Context) {
        let c = &self.controller;
        egui::Area::new(egui::Id::new("hud_plot"))
            .anchor(egui::Align2::LEFT_TOP, [HUD_MARGIN, HUD_MARGIN])
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::NONE
                    .fill(egui::Color32::from_black_alpha(HUD_ALPHA))
                    .inner_margin(egui::Margin::same(8))
                    .corner_radius(HUD_CORNER_RADIUS)
                    .show(ui, |ui| {
                        ui.style_mut().visuals.override_text_color =
                            Some(egui::Color32::from_rgb(220, 220, 220));

                        if c.phase() == PlotPhase::NeedsEscapeCalc {
                            let (done, total) = c.progress();
                            let pct = if total == 0 {
                                0.0
                            } else {
                                done as f64 / total as f64 * 100.0
                            };
                            ui.label(format!("{} {pct:.0}%", c.phase().label()));
                        } else {
                            ui.label(c.phase().label());
                        }
                        ui.label(format!("Iterations: {}", c.cap()));
                        ui.label(format!("Resolution: {:.3e}", c.resolution().to_f64()));
                        ui.label(format!("Precision: {}", self.precision.label()));
                        ui.label(format!("Max: {}", c.rect().max));
                        ui.label(format!("Min: {}", c.rect().min));
                        ui.label(format!("Zooms: {}", c.zoom_count()));
                        ui.label(format!("Points: {}", c.grid().len()));
                        if let Some(stats) = c.last_stats() {
                            ui.label(format!(
                                "Last pass: {} escaped in {:.0} ms",
                                stats.escaped,
                                stats.elapsed.as_secs_f64() * 1000.0
                            ));
                        }

                        let size = c.size();
                        if let Some(p) = self.input.cursor_position().filter(|p| {
                            p.x >= 0
                                && p.y >= 0
                                && (p.x as u32) < size.width
                                && (p.y as u32) < size.height
                        }) {
                            ui.label(format!("Cursor: {}", c.plane_at(p)));
                        }
                        if let Some(corner) = c.selection().corner1() {
                            ui.label(format!("Corner 1: {corner}"));
                            ui.label("Click the opposite corner, right-click to cancel");
                        }
                    });
            });
    }
}

impl<R: Real> eframe::App for MandelZoomApp<R> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.fit_window(ctx);
        self.input.collect(ctx, self.image_origin);
        let phase = self.controller.tick(&mut self.input, &mut self.canvas);
        if phase == PlotPhase::Terminated {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }
        self.canvas.upload(ctx);

        self.show_plot(ctx);
        self.show_hud(ctx);

        if phase != PlotPhase::Idle || self.controller.selection().is_active() {
            ctx.request_repaint();
        }
    }
}

// ---------------------------------------------------------------------------
// Startup
// ---------------------------------------------------------------------------

pub(crate) fn run() -> Result<(), InitError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting MandelZoom");

    let config = PlotConfig::load();
    config.validate()?;
    info!(
        width = config.width,
        height = config.height,
        cap = config.initial_iteration_cap,
        precision = config.precision.label(),
        "Plot configured"
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("MandelZoom")
            .with_inner_size([config.width as f32, config.height as f32]),
        ..Default::default()
    };

    eframe::run_native(
        "MandelZoom",
        options,
        Box::new(move |_cc| {
            let app: Box<dyn eframe::App> = match config.precision {
                Precision::Double => Box::new(MandelZoomApp::<f64>::new(&config)?),
                Precision::DoubleDouble => {
                    Box::new(MandelZoomApp::<DoubleDouble>::new(&config)?)
                }
            };
            Ok(app)
        }),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mandelzoom_render::RenderError;

    #[test]
    fn window_points_scale_with_display() {
        let size = PixelSize::new(2800, 1860).unwrap();
        assert_eq!(window_points(size, 1.0), egui::vec2(2800.0, 1860.0));
        assert_eq!(window_points(size, 2.0), egui::vec2(1400.0, 930.0));
    }

    #[test]
    fn app_builds_from_valid_config() {
        let config = PlotConfig {
            width: 64,
            height: 48,
            ..PlotConfig::default()
        };
        let app = MandelZoomApp::<f64>::new(&config).unwrap();
        assert_eq!(app.controller.size(), PixelSize::new(64, 48).unwrap());
        assert!(!app.window_fitted);
    }

    #[test]
    fn zero_width_config_is_an_error() {
        let config = PlotConfig {
            width: 0,
            ..PlotConfig::default()
        };
        let result = MandelZoomApp::<f64>::new(&config);
        assert!(matches!(result, Err(RenderError::Core(_))));
    }
}
