//! Inline objects embedded in a document.
//!
//! An attachment sits in the text as a single `ATTACHMENT_CHAR` slot; the
//! document keeps the payload keyed by that slot's offset.

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Placeholder scalar occupying an attachment's slot in the text.
pub const ATTACHMENT_CHAR: char = '\u{FFFC}';

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Attachment {
    Image(ImageAttachment),
    File(FileAttachment),
}

/// Encoded image bytes plus the size the host should render them at.
/// The bytes are shared so snapshots stay cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageAttachment {
    pub data: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
}

impl ImageAttachment {
    pub fn new(data: impl Into<Arc<[u8]>>, width: u32, height: u32) -> Self {
        Self {
            data: data.into(),
            width,
            height,
        }
    }

    /// Fit within `max_width`, preserving aspect ratio. Images already narrow
    /// enough (and degenerate zero-sized ones) are returned unchanged.
    pub fn scaled_to_width(self, max_width: u32) -> Self {
        if self.width == 0 || self.height == 0 || max_width == 0 || self.width <= max_width {
            return self;
        }
        let height = (u64::from(self.height) * u64::from(max_width) + u64::from(self.width) / 2)
            / u64::from(self.width);
        Self {
            width: max_width,
            height: u32::try_from(height).unwrap_or(u32::MAX).max(1),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileAttachment {
    pub name: String,
    pub path: PathBuf,
}

impl FileAttachment {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { name, path }
    }

    /// Human-readable label a host can show in place of the file.
    pub fn label(&self) -> String {
        format!("[File: {}]", self.name)
    }
}
