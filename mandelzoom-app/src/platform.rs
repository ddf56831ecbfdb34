//! egui bindings for the controller's input and canvas seams.

use std::collections::VecDeque;

use eframe::egui;

use mandelzoom_core::{PixelPoint, PixelSize};
use mandelzoom_render::{Canvas, RenderBuffer, Rgb};

use crate::input::{Event, InputSource, Key, MouseButton};

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Queues the frame's egui events as controller [`Event`]s.
///
/// Positions are translated from egui points (relative to the window) to
/// pixels of the plot image, given where the image was laid out last frame.
#[derive(Debug, Default)]
pub(crate) struct EguiInput {
    queue: VecDeque<Event>,
    hover: Option<PixelPoint>,
}

impl EguiInput {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Gather this frame's input. `origin` is the screen position of the
    /// image's top-left corner, if it has been laid out yet.
    pub(crate) fn collect(&mut self, ctx: &egui::Context, origin: Option<egui::Pos2>) {
        let ppp = ctx.pixels_per_point();
        ctx.input(|i| {
            if i.viewport().close_requested() {
                self.queue.push_back(Event::Quit);
            }
            let Some(origin) = origin else {
                self.hover = None;
                return;
            };
            self.queue
                .extend(i.events.iter().filter_map(|e| translate(e, origin, ppp)));
            self.hover = i.pointer.hover_pos().map(|p| to_pixel(p, origin, ppp));
        });
    }
}

impl InputSource for EguiInput {
    fn poll_event(&mut self) -> Option<Event> {
        self.queue.pop_front()
    }

    fn cursor_position(&self) -> Option<PixelPoint> {
        self.hover
    }
}

fn to_pixel(pos: egui::Pos2, origin: egui::Pos2, pixels_per_point: f32) -> PixelPoint {
    let v = (pos - origin) * pixels_per_point;
    PixelPoint::new(v.x.floor() as i32, v.y.floor() as i32)
}

/// Presses only; releases, repeats and everything else are dropped.
fn translate(event: &egui::Event, origin: egui::Pos2, pixels_per_point: f32) -> Option<Event> {
    match event {
        egui::Event::PointerButton {
            pos,
            button,
            pressed: true,
            ..
        } => {
            let button = match button {
                egui::PointerButton::Primary => MouseButton::Primary,
                egui::PointerButton::Secondary => MouseButton::Secondary,
                egui::PointerButton::Middle => MouseButton::Middle,
                _ => return None,
            };
            let p = to_pixel(*pos, origin, pixels_per_point);
            Some(Event::ButtonDown {
                button,
                x: p.x,
                y: p.y,
            })
        }
        egui::Event::Key {
            key,
            pressed: true,
            repeat: false,
            ..
        } => Some(Event::KeyDown {
            key: if *key == egui::Key::Escape {
                Key::Escape
            } else {
                Key::Other
            },
        }),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Canvas
// ---------------------------------------------------------------------------

/// A [`RenderBuffer`] mirrored into an egui texture.
///
/// Drawing goes to the buffer; each [`present`](Canvas::present) marks it for
/// upload, and [`upload`](Self::upload) copies it to the GPU on the next frame.
pub(crate) struct TextureCanvas {
    buffer: RenderBuffer,
    texture: Option<egui::TextureHandle>,
    dirty: bool,
}

impl TextureCanvas {
    pub(crate) fn new(size: PixelSize) -> mandelzoom_render::Result<Self> {
        Ok(Self {
            buffer: RenderBuffer::try_new(size.width, size.height)?,
            texture: None,
            dirty: false,
        })
    }

    pub(crate) fn texture(&self) -> Option<&egui::TextureHandle> {
        self.texture.as_ref()
    }

    /// Whether a presented frame is waiting for [`upload`](Self::upload).
    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Push the last presented frame to the GPU if it changed.
    pub(crate) fn upload(&mut self, ctx: &egui::Context) {
        if !self.is_dirty() {
            return;
        }
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [self.buffer.width as usize, self.buffer.height as usize],
            &self.buffer.pixels,
        );
        match &mut self.texture {
            Some(handle) => handle.set(image, egui::TextureOptions::NEAREST),
            None => {
                self.texture =
                    Some(ctx.load_texture("plot", image, egui::TextureOptions::NEAREST));
            }
        }
        self.dirty = false;
    }
}

impl Canvas for TextureCanvas {
    fn size(&self) -> PixelSize {
        self.buffer.size()
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }

    fn draw_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        self.buffer.draw_pixel(x, y, color);
    }

    fn present(&mut self) {
        self.buffer.present();
        self.dirty = true;
    }
}
