//! Editor surfaces as seen by the mode controller
//!
//! The controller never owns editors. It touches them only to change the
//! cursor presentation, and remembers the last focused one by [`EditorId`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Stable handle to an editor surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(pub u64);

/// Cursor presentation for a mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorStyle {
    /// Command mode
    Block,
    /// Insert mode
    #[default]
    Line,
}

/// An editable surface provided by the host
pub trait EditorSurface {
    fn id(&self) -> EditorId;

    fn set_cursor_style(&mut self, style: CursorStyle);

    /// File backing this editor; `None` for consoles, input fields and other
    /// ephemeral editors
    fn virtual_file(&self) -> Option<&Path>;
}

/// Resolves remembered editor ids back to live surfaces
pub trait EditorRegistry {
    /// `None` once the editor has been released
    fn editor_mut(&mut self, id: EditorId) -> Option<&mut dyn EditorSurface>;
}

impl<E: EditorSurface> EditorRegistry for HashMap<EditorId, E> {
    fn editor_mut(&mut self, id: EditorId) -> Option<&mut dyn EditorSurface> {
        self.get_mut(&id).map(|editor| editor as &mut dyn EditorSurface)
    }
}

/// Minimal in-memory editor surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchEditor {
    id: EditorId,
    file: Option<PathBuf>,
    cursor_style: CursorStyle,
}

impl ScratchEditor {
    pub fn new(id: EditorId, file: Option<PathBuf>) -> Self {
        Self {
            id,
            file,
            cursor_style: CursorStyle::default(),
        }
    }

    pub fn cursor_style(&self) -> CursorStyle {
        self.cursor_style
    }
}

impl EditorSurface for ScratchEditor {
    fn id(&self) -> EditorId {
        self.id
    }

    fn set_cursor_style(&mut self, style: CursorStyle) {
        self.cursor_style = style;
    }

    fn virtual_file(&self) -> Option<&Path> {
        self.file.as_deref()
    }
}
