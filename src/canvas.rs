//! Raster canvas surface: owns the pixel buffer, runs the stroke gesture
//! state machine, and keeps the snapshot history.

use image::{imageops, Rgba, RgbaImage};

use crate::color;
use crate::events::{CanvasEvent, CanvasObserver};
use crate::history::{HistoryEntry, SnapshotHistory, DEFAULT_MAX_ENTRIES};
use crate::io;
use crate::log_err;
use crate::ops::{mix, sample};
use crate::tools::{LatchedStroke, MixMode, ToolSelection};

/// Default canvas dimensions.
pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Hard cap on total pixels (~256 megapixels).
const MAX_PIXELS: u64 = 256_000_000;

/// Interpolation step length along a stroke segment, in pixels. Segments
/// longer than this are subdivided so fast pointer motion leaves no gaps.
const STROKE_STEP: f32 = 2.0;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
pub enum CanvasError {
    /// Requested dimensions are zero or exceed the pixel cap. The surface
    /// keeps its previous buffer when a resize fails.
    AllocationLimit { width: u32, height: u32 },
    /// Snapshot bytes could not be encoded or decoded.
    Snapshot(image::ImageError),
}

impl std::fmt::Display for CanvasError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CanvasError::AllocationLimit { width, height } => {
                write!(f, "canvas dimensions {}×{} out of range", width, height)
            }
            CanvasError::Snapshot(e) => write!(f, "snapshot error: {}", e),
        }
    }
}

impl std::error::Error for CanvasError {}

impl From<image::ImageError> for CanvasError {
    fn from(e: image::ImageError) -> Self {
        CanvasError::Snapshot(e)
    }
}

fn validate_dimensions(width: u32, height: u32) -> Result<(), CanvasError> {
    let total = width as u64 * height as u64;
    if width == 0 || height == 0 || total > MAX_PIXELS {
        return Err(CanvasError::AllocationLimit { width, height });
    }
    Ok(())
}

// ============================================================================
// CANVAS SURFACE
// ============================================================================

/// The drawing surface.
///
/// The buffer is allocated at construction, so every live surface is
/// initialized — drawing against a missing buffer is unrepresentable. The
/// stroke state machine is `Idle → StrokeActive → Idle`, encoded as
/// `Option<LatchedStroke>`; no two strokes can be in flight at once.
pub struct CanvasSurface {
    buffer: RgbaImage,
    history: SnapshotHistory,
    /// `Some` while a stroke gesture is active.
    stroke: Option<LatchedStroke>,
    observers: Vec<Box<dyn CanvasObserver>>,
    has_unsaved_changes: bool,
}

impl CanvasSurface {
    /// Allocate a surface and commit the blank canvas as the first history
    /// entry.
    pub fn new(width: u32, height: u32) -> Result<Self, CanvasError> {
        Self::with_max_history(width, height, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_max_history(
        width: u32,
        height: u32,
        max_entries: usize,
    ) -> Result<Self, CanvasError> {
        validate_dimensions(width, height)?;
        let mut surface = Self {
            buffer: RgbaImage::new(width, height),
            history: SnapshotHistory::new(max_entries),
            stroke: None,
            observers: Vec::new(),
            has_unsaved_changes: false,
        };
        surface.save_state();
        Ok(surface)
    }

    // ---- accessors ----------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn buffer(&self) -> &RgbaImage {
        &self.buffer
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    pub fn is_stroke_active(&self) -> bool {
        self.stroke.is_some()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    /// Register a collaborator for state-change notifications.
    pub fn add_observer(&mut self, observer: Box<dyn CanvasObserver>) {
        self.observers.push(observer);
    }

    // ---- stroke state machine -----------------------------------------------

    /// Begin a gesture, latching the current selection.
    ///
    /// In instant mode this performs the whole-canvas mix, commits it, and
    /// completes without entering a stroke. In draw mode it stamps the
    /// initial dot — even a bare tap paints one dot.
    pub fn pointer_down(&mut self, x: f32, y: f32, selection: &ToolSelection) {
        if self.stroke.is_some() {
            // Single-pointer gesture model: a second pointer-down while a
            // stroke is active is not a reachable transition. Serialize by
            // ignoring it.
            return;
        }
        let pos = self.clamp_pos(x, y);
        self.emit(CanvasEvent::StrokeStarted);

        if selection.mix_mode == MixMode::Instant {
            mix::instant_mix(&mut self.buffer, selection.color);
            self.has_unsaved_changes = true;
            self.save_state();
            self.emit(CanvasEvent::InstantMixed);
            return;
        }

        let mut stroke = LatchedStroke::latch(selection, pos);
        stroke.stamp_at(&mut self.buffer, pos, color::DOT_MIX_FACTOR);
        self.stroke = Some(stroke);
        self.has_unsaved_changes = true;
    }

    /// Continue a gesture: stamps interpolated dots from the last position
    /// to `(x, y)`. Ignored while idle or in instant mode.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        let pos = self.clamp_pos(x, y);
        let Some(mut stroke) = self.stroke.take() else {
            return;
        };

        let (x1, y1) = stroke.last_pos;
        let dx = pos.0 - x1;
        let dy = pos.1 - y1;
        let distance = (dx * dx + dy * dy).sqrt();

        if distance >= 0.1 {
            let steps = ((distance / STROKE_STEP).floor() as u32).max(1);
            for i in 0..=steps {
                let t = i as f32 / steps as f32;
                stroke.stamp_at(
                    &mut self.buffer,
                    (x1 + dx * t, y1 + dy * t),
                    color::LINE_MIX_FACTOR,
                );
            }
            stroke.last_pos = pos;
            self.has_unsaved_changes = true;
        }

        self.stroke = Some(stroke);
    }

    /// End the gesture and commit one history entry. Also used for
    /// pointer-leave: whatever was drawn so far is committed.
    pub fn pointer_up(&mut self) {
        if self.stroke.take().is_some() {
            self.save_state();
            self.emit(CanvasEvent::StrokeCommitted);
        }
    }

    // ---- canvas-wide mutations ----------------------------------------------

    /// Fill fully transparent and commit.
    pub fn clear(&mut self) {
        for px in self.buffer.pixels_mut() {
            *px = Rgba([0, 0, 0, 0]);
        }
        self.save_state();
        self.has_unsaved_changes = false;
        self.emit(CanvasEvent::Cleared);
    }

    /// Fill opaquely with `color` and commit.
    pub fn set_background(&mut self, color: Rgba<u8>) {
        let opaque = Rgba([color[0], color[1], color[2], 255]);
        for px in self.buffer.pixels_mut() {
            *px = opaque;
        }
        self.save_state();
        self.has_unsaved_changes = true;
    }

    /// Destructive resize: contents are not preserved or rescaled. On error
    /// the surface is left exactly as it was.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), CanvasError> {
        validate_dimensions(width, height)?;
        self.buffer = RgbaImage::new(width, height);
        self.stroke = None;
        Ok(())
    }

    // ---- undo / redo --------------------------------------------------------

    /// Restore the previous snapshot. No-op at the oldest entry.
    pub fn undo(&mut self) {
        let Some(entry) = self.history.undo() else {
            return;
        };
        let png = entry.bytes().to_vec();
        if let Err(e) = self.replace_from_png(&png) {
            log_err!("undo restore failed: {}", e);
            return;
        }
        self.emit(CanvasEvent::Undone);
    }

    /// Restore the next snapshot. No-op at the tail.
    pub fn redo(&mut self) {
        let Some(entry) = self.history.redo() else {
            return;
        };
        let png = entry.bytes().to_vec();
        if let Err(e) = self.replace_from_png(&png) {
            log_err!("redo restore failed: {}", e);
            return;
        }
        self.emit(CanvasEvent::Redone);
    }

    // ---- snapshots ----------------------------------------------------------

    /// PNG-encode the current buffer. Read-only; history is untouched.
    pub fn export_snapshot(&self) -> Result<Vec<u8>, CanvasError> {
        Ok(io::encode_png(&self.buffer)?)
    }

    /// Restore persisted canvas content: the decoded image is composited
    /// over the current buffer at the origin, then committed.
    pub fn restore_snapshot(&mut self, png: &[u8]) -> Result<(), CanvasError> {
        let img = io::decode_png(png)?;
        imageops::overlay(&mut self.buffer, &img, 0, 0);
        self.save_state();
        Ok(())
    }

    // ---- sampling -----------------------------------------------------------

    /// Most frequent opaque colour in the centre sample patch, for the
    /// mixed-colour preview.
    pub fn dominant_color(&self) -> Option<String> {
        sample::dominant_color(&self.buffer)
    }

    /// Same histogram over a patch centred on an arbitrary point.
    pub fn dominant_color_at(&self, cx: f32, cy: f32) -> Option<String> {
        sample::dominant_color_at(&self.buffer, cx, cy)
    }

    // ---- internals ----------------------------------------------------------

    /// Commit the current buffer as a new history entry.
    fn save_state(&mut self) {
        match io::encode_png(&self.buffer) {
            Ok(png) => self.history.push(HistoryEntry::new(png)),
            // Encoding to memory should not fail; if it somehow does, the
            // canvas stays usable and the entry is skipped.
            Err(e) => log_err!("history snapshot encode failed: {}", e),
        }
    }

    fn replace_from_png(&mut self, png: &[u8]) -> Result<(), CanvasError> {
        self.buffer = io::decode_png(png)?;
        Ok(())
    }

    /// Forgiving UI input: out-of-bounds coordinates clamp to the edge.
    fn clamp_pos(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x.clamp(0.0, (self.buffer.width() - 1) as f32),
            y.clamp(0.0, (self.buffer.height() - 1) as f32),
        )
    }

    fn emit(&mut self, event: CanvasEvent) {
        for observer in &mut self.observers {
            observer.on_canvas_event(event);
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
