//! In-memory document database with live filtered collections.
//!
//! # Architecture
//!
//! ```text
//! Database (Arc<RwLock<Store>>)
//!     │
//!     ├── documents: path → Document
//!     │
//!     └── live queries ──► predicate + on_add handler + member set
//!             │
//!             └── re-evaluated on every insert, handler fired once
//!                 per document, under the write lock
//! ```
//!
//! A `Collection` is a cheap handle onto one live query.

use super::document::Document;
use anyhow::{Context, Result};
use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use walkdir::WalkDir;

/// Selects the documents that belong to a live collection.
pub type Predicate = Box<dyn Fn(&Document) -> bool + Send + Sync>;

/// Runs once for each document entering a live collection.
pub type AddHandler = Box<dyn Fn(&mut Document) + Send + Sync>;

pub const IGNORED_FILE_NAME: &[&str] = &[".DS_Store"];

struct LiveQuery {
    name: String,
    predicate: Predicate,
    on_add: AddHandler,
    members: FxHashSet<PathBuf>,
}

impl LiveQuery {
    /// Track membership changes for `doc`, firing `on_add` for new members.
    fn evaluate(&mut self, doc: &mut Document) {
        if (self.predicate)(doc) {
            if self.members.insert(doc.path.clone()) {
                (self.on_add)(doc);
            }
        } else {
            self.members.remove(&doc.path);
        }
    }
}

#[derive(Default)]
struct Store {
    documents: BTreeMap<PathBuf, Document>,
    queries: Vec<LiveQuery>,
}

/// Shared document store. Clones share the same underlying data.
#[derive(Clone, Default)]
pub struct Database {
    store: Arc<RwLock<Store>>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live collection.
    ///
    /// Documents already in the store are evaluated immediately; later inserts
    /// are evaluated as they arrive.
    pub fn create_live_collection(
        &self,
        name: impl Into<String>,
        predicate: Predicate,
        on_add: AddHandler,
    ) -> Collection {
        let mut store = self.store.write();
        let mut query = LiveQuery {
            name: name.into(),
            predicate,
            on_add,
            members: FxHashSet::default(),
        };

        for doc in store.documents.values_mut() {
            query.evaluate(doc);
        }

        let index = store.queries.len();
        store.queries.push(query);

        Collection {
            db: self.clone(),
            index,
        }
    }

    /// Look up a live collection by the name it was registered with.
    pub fn collection(&self, name: &str) -> Option<Collection> {
        let store = self.store.read();
        store
            .queries
            .iter()
            .position(|q| q.name == name)
            .map(|index| Collection {
                db: self.clone(),
                index,
            })
    }

    /// Insert or replace a document.
    ///
    /// A replacement keeps every flag of the previous version that the new
    /// one leaves unset, so defaults applied by collections survive updates.
    pub fn insert(&self, mut doc: Document) {
        let mut store = self.store.write();
        let Store { documents, queries } = &mut *store;

        if let Some(previous) = documents.get(&doc.path) {
            let meta = &mut doc.meta;
            meta.is_partial = meta.is_partial.or(previous.meta.is_partial);
            meta.render = meta.render.or(previous.meta.render);
            meta.write = meta.write.or(previous.meta.write);
        }

        for query in queries.iter_mut() {
            query.evaluate(&mut doc);
        }

        documents.insert(doc.path.clone(), doc);
    }

    /// Walk `dir` recursively and insert every readable file.
    ///
    /// Returns the number of documents inserted.
    pub fn parse_directory(&self, dir: &Path) -> Result<usize> {
        self.parse_directory_except(dir, None)
    }

    /// Like [`parse_directory`](Self::parse_directory), skipping the `except` subtree.
    pub fn parse_directory_except(&self, dir: &Path, except: Option<&Path>) -> Result<usize> {
        let mut count = 0;
        let walker = WalkDir::new(dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| except.is_none_or(|skip| !e.path().starts_with(skip)));

        for entry in walker {
            let entry =
                entry.with_context(|| format!("Failed to walk directory: {}", dir.display()))?;
            let file_name = entry.file_name().to_str().unwrap_or_default();
            if !entry.file_type().is_file() || IGNORED_FILE_NAME.contains(&file_name) {
                continue;
            }

            let path = entry.into_path();
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read document: {}", path.display()))?;
            self.insert(Document::new(path, content));
            count += 1;
        }

        Ok(count)
    }

    pub fn get(&self, path: &Path) -> Option<Document> {
        self.store.read().documents.get(path).cloned()
    }

    /// Snapshot of every document, ordered by path.
    pub fn documents(&self) -> Vec<Document> {
        self.store.read().documents.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.store.read().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle onto one live query of a [`Database`].
#[derive(Clone)]
pub struct Collection {
    db: Database,
    index: usize,
}

impl Collection {
    pub fn len(&self) -> usize {
        self.db.store.read().queries[self.index].members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find the member that best matches `query`, a path below `root`.
    ///
    /// In order of preference:
    /// 1. the exact path;
    /// 2. a sibling whose file name is the query's plus extensions
    ///    (`header` → `header.html.tpl`);
    /// 3. a member whose path relative to `root` ends with the query's,
    ///    extensions ignored (`nav/menu` → `site/nav/menu.html`).
    ///
    /// Ties go to the shortest path, then the lexicographically smallest.
    pub fn fuzzy_find_one(&self, root: &Path, query: &Path) -> Option<Document> {
        let store = self.db.store.read();
        let members = &store.queries[self.index].members;

        members
            .iter()
            .filter_map(|path| match_rank(root, query, path).map(|rank| (rank, path)))
            .min_by(|(rank_a, a), (rank_b, b)| {
                rank_a
                    .cmp(rank_b)
                    .then_with(|| a.as_os_str().len().cmp(&b.as_os_str().len()))
                    .then_with(|| a.cmp(b))
            })
            .and_then(|(_, path)| store.documents.get(path).cloned())
    }
}

/// Rank how well `candidate` matches `query`; lower is better.
fn match_rank(root: &Path, query: &Path, candidate: &Path) -> Option<u8> {
    if candidate == query {
        return Some(0);
    }

    let query_name = query.file_name()?.to_str()?;
    let candidate_name = candidate.file_name()?.to_str()?;
    if !name_matches(query_name, candidate_name) {
        return None;
    }

    if candidate.parent() == query.parent() {
        return Some(1);
    }

    // Compare the directories leading to the name, relative to the root
    let query_dirs = query.strip_prefix(root).unwrap_or(query).parent()?;
    let candidate_dirs = candidate.strip_prefix(root).unwrap_or(candidate).parent()?;
    candidate_dirs.ends_with(query_dirs).then_some(2)
}

/// `candidate` is `query` itself or `query` followed by extensions.
fn name_matches(query: &str, candidate: &str) -> bool {
    candidate == query
        || candidate
            .strip_prefix(query)
            .is_some_and(|rest| rest.starts_with('.'))
}
