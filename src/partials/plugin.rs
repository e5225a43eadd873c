//! Pipeline hooks wiring the engine into a build.
//!
//! | Hook                   | Effect                                          |
//! |------------------------|-------------------------------------------------|
//! | `extend_collections`   | register `partials`, create the engine          |
//! | `populate_collections` | load `<source>/partials` into the database      |
//! | `extend_template_data` | install `partial(name, data?)`                  |
//! | `render_document`      | resolve the document's `[partial:<id>]` tokens  |
//! | `render_after`         | sweep `[simple_partial:<name>]` tokens          |
//! | `write_after`          | erase `<source>/partials/generated`             |
//!
//! Hooks that run before `extend_collections` leave their input untouched.

use super::{PartialEngine, PartialRegistry, remove_generated};
use crate::{
    config::SiteConfig,
    host::{Database, Document, PartialHelper, Plugin, RenderContext, Renderer},
    log,
};
use anyhow::{Result, bail};
use async_trait::async_trait;
use std::{
    path::PathBuf,
    sync::{Arc, OnceLock},
};

pub struct PartialsPlugin {
    engine: OnceLock<Arc<PartialEngine>>,
    renderer: Arc<dyn Renderer>,
    root: PathBuf,
    extensions: Vec<String>,
    generated: PathBuf,
    settle: bool,
}

impl PartialsPlugin {
    pub fn new(config: &SiteConfig, renderer: Arc<dyn Renderer>) -> Self {
        Self {
            engine: OnceLock::new(),
            renderer,
            root: config.partials_root(),
            extensions: config.partials.extensions.clone(),
            generated: config.generated_dir(),
            settle: config.partials.settle,
        }
    }

    /// The engine for this build, once collections are extended.
    pub fn engine(&self) -> Option<&Arc<PartialEngine>> {
        self.engine.get()
    }
}

#[async_trait]
impl Plugin for PartialsPlugin {
    fn name(&self) -> &str {
        "partials"
    }

    fn extend_collections(&self, db: &Database) {
        self.engine.get_or_init(|| {
            let registry = PartialRegistry::register(db, &self.root, self.extensions.clone());
            PartialEngine::new(registry, Arc::clone(&self.renderer))
        });
    }

    fn populate_collections(&self, db: &Database) -> Result<()> {
        let Some(engine) = self.engine() else {
            bail!("partials collection is not registered");
        };
        engine.registry().populate(db)?;
        Ok(())
    }

    fn extend_template_data(&self, context: &mut RenderContext) {
        if let Some(engine) = self.engine() {
            context.helper = Some(Arc::clone(engine) as Arc<dyn PartialHelper>);
        }
    }

    async fn render_document(&self, _document: &Document, content: String) -> String {
        match self.engine() {
            Some(engine) => engine.resolve_content(content).await,
            None => content,
        }
    }

    async fn render_after(&self, documents: &mut [Document]) {
        let Some(engine) = self.engine() else {
            return;
        };
        if self.settle {
            engine.settle().await;
        }
        let rewritten = engine.sweep_documents(documents);
        if rewritten > 0 {
            log!("partials"; "resolved simple partials in {} documents", rewritten);
        }
    }

    fn write_after(&self) -> Result<()> {
        remove_generated(&self.generated)?;
        Ok(())
    }
}
