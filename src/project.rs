//! Open-document metadata. The canvas content itself lives on the surface;
//! only the raster snapshot is ever persisted alongside this record.

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use uuid::Uuid;

/// Single open document.
pub struct Project {
    pub id: Uuid,
    pub name: String,
    /// `None` for unsaved/untitled projects.
    pub path: Option<PathBuf>,
    pub is_dirty: bool,
    pub created_unix: u64,
    pub modified_unix: u64,
}

impl Project {
    pub fn new_untitled(untitled_counter: usize) -> Self {
        let now = now_unix();
        Self {
            id: Uuid::new_v4(),
            name: format!("Untitled-{}", untitled_counter),
            path: None,
            is_dirty: false,
            created_unix: now,
            modified_unix: now,
        }
    }

    /// Rebuild a project record loaded from a `.clq` file.
    pub fn restored(
        id: Uuid,
        name: String,
        path: Option<PathBuf>,
        created_unix: u64,
        modified_unix: u64,
    ) -> Self {
        Self {
            id,
            name,
            path,
            is_dirty: false,
            created_unix,
            modified_unix,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
        self.modified_unix = now_unix();
    }

    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }

    /// Display name with dirty indicator.
    pub fn display_title(&self) -> String {
        if self.is_dirty {
            format!("{}*", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Seconds since the Unix epoch; 0 if the clock is before it.
pub fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
