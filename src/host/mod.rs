//! The host side of the pipeline: documents, the database, rendering.
//!
//! Plugins only see the narrow contracts defined here:
//!
//! - [`Renderer`]: turn a document plus template data into a string
//! - [`PartialHelper`]: the `partial(name, data?)` function templates call
//! - [`Plugin`]: hooks the build pipeline runs in a fixed order

mod database;
mod document;
mod template;

pub use database::{AddHandler, Collection, Database, Predicate};
pub use document::{Document, DocumentMeta};
pub use template::{TemplateError, TemplateRenderer};

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Data bindings visible to a template.
pub type TemplateData = serde_json::Map<String, serde_json::Value>;

/// Template-facing `partial(name, data?)` function.
///
/// Returns text to embed immediately. Never fails: problems surface as text.
pub trait PartialHelper: Send + Sync {
    fn partial(&self, name: &str, data: Option<TemplateData>, context: &TemplateData) -> String;
}

/// Everything a single render call can see.
#[derive(Clone, Default)]
pub struct RenderContext {
    pub data: TemplateData,
    pub helper: Option<Arc<dyn PartialHelper>>,
}

impl RenderContext {
    pub fn new(data: TemplateData) -> Self {
        Self { data, helper: None }
    }
}

/// Renders one document. Completion is asynchronous.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, document: &Document, context: RenderContext) -> Result<String>;
}

/// Build pipeline extension points, in the order the pipeline calls them.
#[async_trait]
pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;

    /// Register the plugin's live collections.
    fn extend_collections(&self, _db: &Database) {}

    /// Insert the plugin's own documents into the database.
    fn populate_collections(&self, _db: &Database) -> Result<()> {
        Ok(())
    }

    /// Add helpers or bindings before a document renders.
    fn extend_template_data(&self, _context: &mut RenderContext) {}

    /// Post-process one document's freshly rendered content.
    async fn render_document(&self, _document: &Document, content: String) -> String {
        content
    }

    /// Runs once every document has its `content_rendered`.
    async fn render_after(&self, _documents: &mut [Document]) {}

    /// Runs after the output has been written.
    fn write_after(&self) -> Result<()> {
        Ok(())
    }
}
