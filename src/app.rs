//! Composition root: wires the tool selection, the canvas surface and the
//! open project together.
//!
//! Everything flows through this explicit context — there is no ambient
//! global canvas or app singleton. Optional collaborators subscribe as
//! observers on the surface; absent collaborators are simply never
//! registered.

use std::path::{Path, PathBuf};

use crate::canvas::{CanvasError, CanvasSurface};
use crate::color::{self, ColorError};
use crate::io::{self, ClqError};
use crate::log_info;
use crate::project::Project;
use crate::tools::{MixMode, Tool, ToolSelection};

pub struct App {
    pub selection: ToolSelection,
    pub surface: CanvasSurface,
    pub project: Project,
}

impl App {
    /// New untitled project over a freshly allocated surface.
    pub fn new(width: u32, height: u32) -> Result<Self, CanvasError> {
        Ok(Self {
            selection: ToolSelection::default(),
            surface: CanvasSurface::new(width, height)?,
            project: Project::new_untitled(1),
        })
    }

    // ---- selection (affects the next stroke only) ---------------------------

    pub fn set_tool(&mut self, tool: Tool) {
        self.selection.tool = tool;
    }

    /// Strict hex parse; the selection is untouched on error.
    pub fn set_color(&mut self, hex: &str) -> Result<(), ColorError> {
        self.selection.color = color::parse_hex(hex)?;
        Ok(())
    }

    /// Brush diameter in pixels, floored at 1.
    pub fn set_brush_size(&mut self, px: f32) {
        self.selection.brush_size = px.max(1.0);
    }

    pub fn set_brush_opacity(&mut self, opacity: f32) {
        self.selection.brush_opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_mix_mode(&mut self, mode: MixMode) {
        self.selection.mix_mode = mode;
    }

    // ---- pointer gestures ---------------------------------------------------

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.surface.pointer_down(x, y, &self.selection);
        self.project.mark_dirty();
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.surface.pointer_move(x, y);
    }

    pub fn pointer_up(&mut self) {
        self.surface.pointer_up();
    }

    // ---- canvas operations --------------------------------------------------

    pub fn clear(&mut self) {
        self.surface.clear();
        self.project.mark_dirty();
    }

    pub fn undo(&mut self) {
        self.surface.undo();
    }

    pub fn redo(&mut self) {
        self.surface.redo();
    }

    pub fn export_snapshot(&self) -> Result<Vec<u8>, CanvasError> {
        self.surface.export_snapshot()
    }

    pub fn dominant_color(&self) -> Option<String> {
        self.surface.dominant_color()
    }

    // ---- persistence --------------------------------------------------------

    /// Save the project (raster snapshot only) to `path`.
    pub fn save_project(&mut self, path: &Path) -> Result<(), ClqError> {
        let png = io::encode_png(self.surface.buffer())?;
        io::save_clq(&self.project, &png, path)?;
        self.project.path = Some(path.to_path_buf());
        self.project.mark_clean();
        log_info!("saved project {:?} to {}", self.project.name, path.display());
        Ok(())
    }

    /// Open a `.clq` file: the surface is sized to the stored snapshot and
    /// the snapshot composited onto it.
    pub fn open_project(path: &Path) -> Result<Self, ClqError> {
        let (project, snapshot_png) = io::load_clq(path)?;
        let decoded = io::decode_png(&snapshot_png)?;
        let mut surface = CanvasSurface::new(decoded.width(), decoded.height())
            .map_err(|e| ClqError::InvalidFormat(e.to_string()))?;
        surface
            .restore_snapshot(&snapshot_png)
            .map_err(|e| ClqError::InvalidFormat(e.to_string()))?;
        log_info!("opened project {:?} from {}", project.name, path.display());
        Ok(Self {
            selection: ToolSelection::default(),
            surface,
            project,
        })
    }

    /// Path the project was last saved to, if any.
    pub fn project_path(&self) -> Option<&PathBuf> {
        self.project.path.as_ref()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use uuid::Uuid;

    #[test]
    fn set_color_rejects_bad_hex_without_touching_the_selection() {
        let mut app = App::new(64, 64).unwrap();
        app.set_color("#FF0000").unwrap();
        assert!(app.set_color("nope").is_err());
        assert_eq!(app.selection.color, Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn selection_setters_clamp_their_inputs() {
        let mut app = App::new(64, 64).unwrap();
        app.set_brush_size(0.0);
        assert_eq!(app.selection.brush_size, 1.0);
        app.set_brush_opacity(7.0);
        assert_eq!(app.selection.brush_opacity, 1.0);
        app.set_brush_opacity(-1.0);
        assert_eq!(app.selection.brush_opacity, 0.0);
    }

    #[test]
    fn latched_stroke_ignores_selection_changes() {
        let mut app = App::new(200, 100).unwrap();
        app.set_color("#FF0000").unwrap();
        app.set_brush_size(10.0);

        app.pointer_down(50.0, 50.0);
        app.set_color("#0000FF").unwrap();
        app.pointer_move(80.0, 50.0);
        app.pointer_up();

        assert_eq!(
            *app.surface.buffer().get_pixel(70, 50),
            Rgba([255, 0, 0, 255])
        );
    }

    #[test]
    fn drawing_marks_the_project_dirty() {
        let mut app = App::new(64, 64).unwrap();
        assert!(!app.project.is_dirty);
        app.pointer_down(32.0, 32.0);
        app.pointer_up();
        assert!(app.project.is_dirty);
    }

    #[test]
    fn save_and_open_round_trip() {
        let path = std::env::temp_dir().join(format!("colorq-app-{}.clq", Uuid::new_v4()));

        let mut app = App::new(48, 32).unwrap();
        app.set_color("#FF8800").unwrap();
        app.pointer_down(24.0, 16.0);
        app.pointer_up();
        app.save_project(&path).unwrap();
        assert!(!app.project.is_dirty);

        let reopened = App::open_project(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(reopened.project.id, app.project.id);
        assert_eq!(
            (reopened.surface.width(), reopened.surface.height()),
            (48, 32)
        );
        assert_eq!(
            *reopened.surface.buffer().get_pixel(24, 16),
            Rgba([255, 136, 0, 255])
        );
    }
}
