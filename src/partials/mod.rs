//! Partial resolution engine.
//!
//! Partials are reusable fragments stored as their own documents. Templates
//! request them through `partial(name, data?)`, which answers immediately
//! with a placeholder token; rendering happens later, in two phases.
//!
//! # Architecture
//!
//! ```text
//! template calls partial(name, data?)
//!     │
//!     ├── unknown name ───────────► "Partial <name> doesn't exist"
//!     │
//!     ├── Cacheable ──► SimpleCache (rendered once, in the background)
//!     │                    └──► "[simple_partial:<name>]"
//!     │                              │
//!     │                              └── render_after: sweep every document
//!     │
//!     └── Parameterized ──► DeferredRenders (job per call)
//!                              └──► "[partial:<id>]"
//!                                        │
//!                                        └── render_document: run this
//!                                            document's jobs, join, splice
//! ```
//!
//! All state lives in one [`PartialEngine`] per build, so repeated builds in
//! the same process never share cache entries or token ids.

mod cache;
mod cleanup;
mod coordinator;
mod plugin;
mod registry;
mod resolver;
mod sweep;
pub mod token;


pub use cache::{SimpleCache, strip_trailing_newline};
pub use cleanup::remove_generated;
pub use coordinator::{DeferredRenders, RenderJob};
pub use plugin::PartialsPlugin;
pub use registry::{COLLECTION_NAME, PartialRegistry, RenderStrategy, ResolvedPartial};
pub use token::TokenId;

use crate::host::{PartialHelper, RenderContext, Renderer, TemplateData};
use std::sync::{Arc, Weak};

/// Text substituted for a name the registry cannot resolve.
pub fn missing_partial(name: &str) -> String {
    format!("Partial {name} doesn't exist")
}

/// Text substituted for a partial whose render failed.
pub fn unrenderable_partial(name: &str) -> String {
    format!("Partial {name} can't be rendered")
}

/// Run-scoped partial state: registry, cache, job tables.
pub struct PartialEngine {
    this: Weak<PartialEngine>,
    registry: PartialRegistry,
    renderer: Arc<dyn Renderer>,
    simple: SimpleCache,
    deferred: DeferredRenders,
}

impl PartialEngine {
    pub fn new(registry: PartialRegistry, renderer: Arc<dyn Renderer>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            registry,
            renderer,
            simple: SimpleCache::new(),
            deferred: DeferredRenders::new(),
        })
    }

    pub fn registry(&self) -> &PartialRegistry {
        &self.registry
    }

    pub fn simple_cache(&self) -> &SimpleCache {
        &self.simple
    }

    pub fn deferred(&self) -> &DeferredRenders {
        &self.deferred
    }

    /// Wait for every background render of a cacheable partial.
    pub async fn settle(&self) {
        self.simple.settle().await;
    }

    /// Context for rendering a partial: the given data plus this engine as
    /// the `partial` helper, so partials can nest.
    fn partial_context(&self, data: TemplateData) -> RenderContext {
        RenderContext {
            data,
            helper: self
                .this
                .upgrade()
                .map(|engine| engine as Arc<dyn PartialHelper>),
        }
    }
}
