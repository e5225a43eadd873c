//! Post-render sweep of simple partial tokens.
//!
//! Runs once the whole collection has rendered and substitutes whatever the
//! cache holds at that moment. It does not wait for background renders: a
//! name still pending becomes "" in this document, while documents swept
//! after the render completes get the real output.

use super::{PartialEngine, token};
use crate::host::Document;

impl PartialEngine {
    /// Substitute simple tokens in `content`, or `None` if there are none.
    pub fn sweep_content(&self, content: &str) -> Option<String> {
        if token::simple_keys(content).is_empty() {
            return None;
        }
        let swept =
            token::replace_simple(content, |name| self.simple.get(name).unwrap_or_default());
        Some(swept.into_owned())
    }

    /// Sweep the rendered content of every document in the collection.
    ///
    /// Returns the number of documents rewritten.
    pub fn sweep_documents(&self, documents: &mut [Document]) -> usize {
        let mut rewritten = 0;
        for doc in documents.iter_mut() {
            let Some(rendered) = doc.content_rendered.as_deref() else {
                continue;
            };
            if let Some(swept) = self.sweep_content(rendered) {
                doc.content_rendered = Some(swept);
                rewritten += 1;
            }
        }
        rewritten
    }
}
