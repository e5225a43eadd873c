//! Documents stored in the host database.

use std::path::{Path, PathBuf};

/// Per-document flags set by plugins.
///
/// Every flag is unset until someone sets it; the pipeline treats an unset
/// `render`/`write` as `true`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentMeta {
    /// Marks the document as a partial regardless of its location.
    pub is_partial: Option<bool>,
    /// Whether the pipeline renders the document as a page.
    pub render: Option<bool>,
    /// Whether the pipeline writes the document to the output directory.
    pub write: Option<bool>,
}

/// A source file loaded into the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Absolute path, unique within the database.
    pub path: PathBuf,
    /// Raw source content.
    pub content: String,
    /// Every dotted suffix after the base name, outermost last.
    ///
    /// `header.html.tpl` → `["html", "tpl"]`
    pub extensions: Vec<String>,
    pub meta: DocumentMeta,
    /// Final output once the collection has rendered.
    pub content_rendered: Option<String>,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        let path = path.into();
        let extensions = parse_extensions(&path);
        Self {
            path,
            content: content.into(),
            extensions,
            meta: DocumentMeta::default(),
            content_rendered: None,
        }
    }

    /// Whether the document carries the given extension.
    pub fn has_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e == ext)
    }

    pub fn should_render(&self) -> bool {
        self.meta.render.unwrap_or(true)
    }

    pub fn should_write(&self) -> bool {
        self.meta.write.unwrap_or(true)
    }

    /// File name with every extension removed (`header.html.tpl` → `header`).
    pub fn base_name(&self) -> &str {
        base_name(&self.path)
    }

    /// Output path relative to the source root: the file name keeps only its
    /// first extension (`about.html.tpl` → `about.html`).
    pub fn output_relative(&self, source_root: &Path) -> PathBuf {
        let relative = self.path.strip_prefix(source_root).unwrap_or(&self.path);
        let file_name = match self.extensions.first() {
            Some(ext) => format!("{}.{ext}", self.base_name()),
            None => self.base_name().to_owned(),
        };
        relative.with_file_name(file_name)
    }
}

/// File name up to the first dot. Dotfiles keep their leading dot.
fn base_name(path: &Path) -> &str {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    match name.char_indices().skip(1).find(|&(_, c)| c == '.') {
        Some((idx, _)) => &name[..idx],
        None => name,
    }
}

fn parse_extensions(path: &Path) -> Vec<String> {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    let base = base_name(path);
    name[base.len()..]
        .split('.')
        .filter(|ext| !ext.is_empty())
        .map(str::to_owned)
        .collect()
}
