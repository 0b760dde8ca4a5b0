//! Canvas state-change notifications.
//!
//! The surface emits these directly after each state transition; interested
//! collaborators (gamification, autosave, previews) subscribe at composition
//! time. Collaborators that may be absent are simply never registered.

/// Notification fired by the canvas surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CanvasEvent {
    /// A pointer gesture began (draw or instant mode).
    StrokeStarted,
    /// A draw-mode gesture finished and its history entry was committed.
    StrokeCommitted,
    /// An instant-mix pass completed and was committed.
    InstantMixed,
    /// The canvas was cleared.
    Cleared,
    Undone,
    Redone,
}

/// Receiver for canvas events.
pub trait CanvasObserver {
    fn on_canvas_event(&mut self, event: CanvasEvent);
}
