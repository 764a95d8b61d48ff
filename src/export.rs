//! Export bundle for the clipboard: rendered HTML alongside the raw Markdown.

use crate::markdown;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const HTML_FILE: &str = "summary.html";
pub const MARKDOWN_FILE: &str = "summary.md";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write export: {0}")]
    WriteError(#[from] std::io::Error),
}

/// Rich and plain representations of one summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBundle {
    pub html: String,
    pub plain: String,
}

impl ExportBundle {
    /// Build the bundle from (labeled) Markdown
    pub fn from_markdown(markdown_text: &str) -> Self {
        Self {
            html: markdown::render(markdown_text),
            plain: markdown_text.to_string(),
        }
    }

    /// Write `summary.html` and `summary.md` into `dir`, creating it if needed.
    pub fn write_to<P: AsRef<Path>>(&self, dir: P) -> Result<(PathBuf, PathBuf), ExportError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let html_path = dir.join(HTML_FILE);
        let markdown_path = dir.join(MARKDOWN_FILE);
        std::fs::write(&html_path, &self.html)?;
        std::fs::write(&markdown_path, &self.plain)?;
        Ok((html_path, markdown_path))
    }
}
