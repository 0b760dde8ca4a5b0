//! colorQ core — the canvas colour-mixing engine.
//!
//! Two tightly coupled pieces: a pure colour blend engine ([`color`]) and a
//! raster canvas surface ([`canvas`]) that owns the pixel buffer, runs the
//! stroke gesture state machine, and keeps a bounded undo/redo history of
//! full-canvas snapshots ([`history`]). Drawing happens in two modes —
//! progressive brush blending while the pointer moves, and a single-click
//! whole-canvas "instant mix" ([`ops::mix`]).
//!
//! This is an in-process library; UI, gamification and storage collaborators
//! sit outside and talk to [`app::App`] (or [`canvas::CanvasSurface`]
//! directly), subscribing to [`events::CanvasEvent`] notifications.

pub mod logger;

pub mod app;
pub mod canvas;
pub mod color;
pub mod events;
pub mod history;
pub mod io;
pub mod ops;
pub mod project;
pub mod tools;

pub use app::App;
pub use canvas::{CanvasError, CanvasSurface, DEFAULT_HEIGHT, DEFAULT_WIDTH};
pub use color::ColorError;
pub use events::{CanvasEvent, CanvasObserver};
pub use history::{HistoryEntry, SnapshotHistory};
pub use io::ClqError;
pub use project::Project;
pub use tools::{EnhancedTool, MixMode, Tool, ToolSelection};
