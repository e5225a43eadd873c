//! Deferred rendering of parameterized partials.
//!
//! Each `partial()` call on a parameterized partial mints an id and parks a
//! [`RenderJob`]. Once a document has finished rendering, the jobs whose
//! tokens appear in its content run concurrently; the content is rewritten
//! only after all of them have completed.

use super::{PartialEngine, token, token::TokenId, unrenderable_partial};
use crate::{
    host::{Document, TemplateData},
    log,
};
use futures::future::{BoxFuture, join_all};
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

/// One pending render of a parameterized partial.
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// Name the partial was requested by (for messages).
    pub name: String,
    pub partial: Arc<Document>,
    /// Caller data merged over the caller's context.
    pub data: TemplateData,
}

/// Pending-job and result tables, plus the id counter.
#[derive(Debug, Default)]
pub struct DeferredRenders {
    next_id: AtomicU64,
    pending: Mutex<FxHashMap<TokenId, RenderJob>>,
    results: Mutex<FxHashMap<TokenId, String>>,
}

impl DeferredRenders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id. Ids are never reused within one table set.
    pub fn mint(&self) -> TokenId {
        TokenId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    pub fn register(&self, id: TokenId, job: RenderJob) {
        self.pending.lock().insert(id, job);
    }

    /// Remove and return the jobs for the given raw ids.
    ///
    /// Unknown, malformed and repeated ids are skipped, so every job is
    /// handed out at most once.
    pub fn take_jobs(&self, raw_ids: &[&str]) -> Vec<(TokenId, RenderJob)> {
        let mut pending = self.pending.lock();
        let mut seen = FxHashSet::default();
        raw_ids
            .iter()
            .filter_map(|raw| raw.parse::<TokenId>().ok())
            .filter(|id| seen.insert(*id))
            .filter_map(|id| pending.remove(&id).map(|job| (id, job)))
            .collect()
    }

    pub fn record(&self, id: TokenId, output: String) {
        self.results.lock().insert(id, output);
    }

    /// Replace every `[partial:<id>]` in `content` with its recorded result.
    ///
    /// Tokens without a result become "". Results are dropped once spliced.
    pub fn substitute(&self, content: &str) -> String {
        let mut results = self.results.lock();
        let mut used = Vec::new();

        let output = token::replace_parameterized(content, |raw| {
            let Ok(id) = raw.parse::<TokenId>() else {
                return String::new();
            };
            used.push(id);
            results.get(&id).cloned().unwrap_or_default()
        })
        .into_owned();

        for id in used {
            results.remove(&id);
        }
        output
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn results_len(&self) -> usize {
        self.results.lock().len()
    }
}

impl PartialEngine {
    /// Resolve every parameterized token in `content`.
    ///
    /// Runs the matching jobs concurrently, waits for all of them and splices
    /// their output in. A failing job contributes its failure marker; it never
    /// fails the document. Content without tokens is returned untouched.
    pub fn resolve_content(&self, content: String) -> BoxFuture<'_, String> {
        Box::pin(async move {
            let ids = token::parameterized_keys(&content);
            if ids.is_empty() {
                return content;
            }

            let jobs = self.deferred.take_jobs(&ids);
            join_all(jobs.into_iter().map(|(id, job)| self.run_job(id, job))).await;

            self.deferred.substitute(&content)
        })
    }

    async fn run_job(&self, id: TokenId, job: RenderJob) {
        let RenderJob { name, partial, data } = job;
        let output = match self.renderer.render(&partial, self.partial_context(data)).await {
            // Tokens minted while rendering the partial resolve in its own join
            Ok(output) => self.resolve_content(output).await,
            Err(err) => {
                log!("error"; "rendering {} failed: {:#}", name, err);
                unrenderable_partial(&name)
            }
        };
        self.deferred.record(id, output);
    }
}
