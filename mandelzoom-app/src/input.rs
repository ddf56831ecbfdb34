use mandelzoom_core::PixelPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MouseButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Key {
    Escape,
    Other,
}

/// Input the plot controller reacts to. Positions are viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    /// The window was asked to close.
    Quit,
    ButtonDown { button: MouseButton, x: i32, y: i32 },
    KeyDown { key: Key },
}

/// Source of input events, polled once per control-loop pass.
pub(crate) trait InputSource {
    /// Next queued event, or `None` once this pass's events are drained.
    /// Never blocks.
    fn poll_event(&mut self) -> Option<Event>;

    /// Last known pointer position over the viewport.
    fn cursor_position(&self) -> Option<PixelPoint>;
}
