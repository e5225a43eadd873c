//! The template-facing `partial(name, data?)` function.
//!
//! Always answers synchronously. Rendering is scheduled, never awaited here.

use super::{
    PartialEngine, RenderJob, RenderStrategy, missing_partial, strip_trailing_newline, token,
    unrenderable_partial,
};
use crate::{
    host::{Document, PartialHelper, TemplateData},
    log,
};
use std::sync::Arc;
use tokio::runtime::Handle;

impl PartialHelper for PartialEngine {
    fn partial(&self, name: &str, data: Option<TemplateData>, context: &TemplateData) -> String {
        let Some(resolved) = self.registry.lookup(name) else {
            return missing_partial(name);
        };

        if resolved.document.content.is_empty() {
            return String::new();
        }

        match resolved.strategy {
            RenderStrategy::Cacheable => self.request_simple(name, resolved.document),
            RenderStrategy::Parameterized => {
                self.request_deferred(name, resolved.document, data, context)
            }
        }
    }
}

impl PartialEngine {
    /// Return the simple token, scheduling the one render this name gets.
    fn request_simple(&self, name: &str, document: Arc<Document>) -> String {
        let placeholder = token::simple_token(name);
        if !self.simple.claim(name) {
            return placeholder;
        }

        let (Some(engine), Ok(runtime)) = (self.this.upgrade(), Handle::try_current()) else {
            log!("error"; "cannot schedule render of {}: no async runtime", name);
            self.simple.fulfil(name, unrenderable_partial(name));
            return placeholder;
        };

        let owned_name = name.to_owned();
        let handle = runtime.spawn(async move {
            engine.render_simple(owned_name, document).await;
        });
        self.simple.track(handle);

        placeholder
    }

    /// Render a cacheable partial with no data and store the outcome.
    async fn render_simple(&self, name: String, document: Arc<Document>) {
        let context = self.partial_context(TemplateData::new());
        let value = match self.renderer.render(&document, context).await {
            Ok(output) => {
                let output = self.resolve_content(output).await;
                strip_trailing_newline(&output).to_owned()
            }
            Err(err) => {
                log!("error"; "rendering {} failed: {:#}", name, err);
                unrenderable_partial(&name)
            }
        };
        self.simple.fulfil(&name, value);
    }

    /// Park a render job for the caller's document and return its token.
    fn request_deferred(
        &self,
        name: &str,
        document: Arc<Document>,
        data: Option<TemplateData>,
        context: &TemplateData,
    ) -> String {
        // The partial sees the caller's bindings; explicit data wins on conflict
        let mut merged = context.clone();
        merged.extend(data.unwrap_or_default());

        let id = self.deferred.mint();
        self.deferred.register(
            id,
            RenderJob {
                name: name.to_owned(),
                partial: document,
                data: merged,
            },
        );
        token::parameterized_token(id)
    }
}
