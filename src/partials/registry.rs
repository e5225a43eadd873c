//! The `partials` live collection.
//!
//! Any document flagged `is_partial`, or living below the partials root,
//! joins the collection. On joining it is marked as a partial, excluded from
//! page rendering and writing, and assigned its [`RenderStrategy`].

use crate::{
    host::{Collection, Database, Document},
    log,
};
use anyhow::Result;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

/// Name the collection is registered under.
pub const COLLECTION_NAME: &str = "partials";

/// How a partial is rendered, decided once when it joins the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStrategy {
    /// No per-call data: rendered once per build, shared by name.
    Cacheable,
    /// Rendered per call with the caller's data.
    Parameterized,
}

impl RenderStrategy {
    /// `Parameterized` iff any of the document's extensions is templated.
    pub fn for_document(doc: &Document, templated: &[String]) -> Self {
        if templated.iter().any(|ext| doc.has_extension(ext)) {
            Self::Parameterized
        } else {
            Self::Cacheable
        }
    }
}

/// A partial found by name.
#[derive(Debug, Clone)]
pub struct ResolvedPartial {
    pub document: Arc<Document>,
    pub strategy: RenderStrategy,
}

/// Live view over the partial documents of a database.
#[derive(Clone)]
pub struct PartialRegistry {
    root: PathBuf,
    collection: Collection,
    strategies: Arc<RwLock<FxHashMap<PathBuf, RenderStrategy>>>,
}

impl PartialRegistry {
    /// Register the `partials` collection on `db`.
    ///
    /// `templated` lists the extensions that make a partial parameterized.
    pub fn register(db: &Database, root: impl Into<PathBuf>, templated: Vec<String>) -> Self {
        let root = root.into();
        let strategies: Arc<RwLock<FxHashMap<PathBuf, RenderStrategy>>> = Arc::default();

        let predicate_root = root.clone();
        let handler_strategies = Arc::clone(&strategies);
        let collection = db.create_live_collection(
            COLLECTION_NAME,
            Box::new(move |doc: &Document| {
                doc.meta.is_partial == Some(true) || doc.path.starts_with(&predicate_root)
            }),
            Box::new(move |doc: &mut Document| {
                doc.meta.is_partial = Some(true);
                doc.meta.render = Some(false);
                doc.meta.write = Some(false);

                let strategy = RenderStrategy::for_document(doc, &templated);
                handler_strategies.write().insert(doc.path.clone(), strategy);
            }),
        );

        Self {
            root,
            collection,
            strategies,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the partials root and insert its files into `db`.
    ///
    /// A missing partials directory is not an error.
    pub fn populate(&self, db: &Database) -> Result<usize> {
        if !self.root.is_dir() {
            log!("warn"; "no partials directory at {}", self.root.display());
            return Ok(0);
        }
        let count = db.parse_directory(&self.root)?;
        log!("partials"; "found {} partials", count);
        Ok(count)
    }

    /// Resolve a short partial name (`header`, `nav/menu`, `footer.html`).
    pub fn lookup(&self, name: &str) -> Option<ResolvedPartial> {
        let document = self.collection.fuzzy_find_one(&self.root, &self.root.join(name))?;
        let strategy = self
            .strategies
            .read()
            .get(&document.path)
            .copied()
            .unwrap_or(RenderStrategy::Cacheable);

        Some(ResolvedPartial {
            document: Arc::new(document),
            strategy,
        })
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn templated() -> Vec<String> {
        vec!["tpl".to_owned()]
    }

    #[test]
    fn test_defaults_applied_on_join() {
        let db = Database::new();
        let registry = PartialRegistry::register(&db, "/src/partials", templated());

        db.insert(Document::new("/src/partials/header.html", "<h/>"));
        db.insert(Document::new("/src/index.html", "<body/>"));

        let header = db.get(Path::new("/src/partials/header.html")).unwrap();
        assert_eq!(header.meta.is_partial, Some(true));
        assert!(!header.should_render());
        assert!(!header.should_write());

        let index = db.get(Path::new("/src/index.html")).unwrap();
        assert!(index.should_render());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_flagged_document_outside_root_joins() {
        let db = Database::new();
        let registry = PartialRegistry::register(&db, "/src/partials", templated());

        let mut doc = Document::new("/src/widgets/card.html.tpl", "{{ title }}");
        doc.meta.is_partial = Some(true);
        db.insert(doc);

        let card = db.get(Path::new("/src/widgets/card.html.tpl")).unwrap();
        assert!(!card.should_write());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_defaults_survive_updates() {
        let db = Database::new();
        let _registry = PartialRegistry::register(&db, "/src/partials", templated());

        db.insert(Document::new("/src/partials/header.html", "v1"));
        db.insert(Document::new("/src/partials/header.html", "v2"));

        let header = db.get(Path::new("/src/partials/header.html")).unwrap();
        assert_eq!(header.content, "v2");
        assert_eq!(header.meta.render, Some(false));
        assert_eq!(header.meta.write, Some(false));
    }

    #[test]
    fn test_strategy_by_extension() {
        let db = Database::new();
        let registry = PartialRegistry::register(&db, "/p", templated());
        db.insert(Document::new("/p/header.html", ""));
        db.insert(Document::new("/p/card.html.tpl", ""));
        db.insert(Document::new("/p/LICENSE", ""));

        assert_eq!(registry.lookup("header").unwrap().strategy, RenderStrategy::Cacheable);
        assert_eq!(registry.lookup("card").unwrap().strategy, RenderStrategy::Parameterized);
        assert_eq!(registry.lookup("LICENSE").unwrap().strategy, RenderStrategy::Cacheable);
    }

    #[test]
    fn test_no_templated_extensions_means_cacheable() {
        let db = Database::new();
        let registry = PartialRegistry::register(&db, "/p", Vec::new());
        db.insert(Document::new("/p/card.html.tpl", ""));

        assert_eq!(registry.lookup("card").unwrap().strategy, RenderStrategy::Cacheable);
    }

    #[test]
    fn test_lookup_nested_name_without_prefix() {
        let db = Database::new();
        let registry = PartialRegistry::register(&db, "/p", templated());
        db.insert(Document::new("/p/site/nav/menu.html", "<nav/>"));

        let menu = registry.lookup("nav/menu").unwrap();
        assert_eq!(menu.document.path, Path::new("/p/site/nav/menu.html"));
        assert!(registry.lookup("site/menu").is_none());
    }

    #[test]
    fn test_lookup_miss_is_none() {
        let db = Database::new();
        let registry = PartialRegistry::register(&db, "/p", templated());
        assert!(registry.lookup("nope").is_none());
    }

    #[test]
    fn test_populate_reads_directory() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("partials");
        fs::create_dir_all(root.join("nav")).unwrap();
        fs::write(root.join("header.html"), "<h/>\n").unwrap();
        fs::write(root.join("nav/menu.html.tpl"), "{{ title }}").unwrap();

        let db = Database::new();
        let registry = PartialRegistry::register(&db, &root, templated());
        assert_eq!(registry.populate(&db).unwrap(), 2);

        let menu = registry.lookup("nav/menu").unwrap();
        assert_eq!(menu.document.content, "{{ title }}");
        assert_eq!(menu.strategy, RenderStrategy::Parameterized);
        assert!(registry.lookup("menu").is_some());
    }

    #[test]
    fn test_populate_missing_directory() {
        let dir = TempDir::new().unwrap();
        let db = Database::new();
        let registry = PartialRegistry::register(&db, dir.path().join("partials"), templated());

        assert_eq!(registry.populate(&db).unwrap(), 0);
        assert!(registry.is_empty());
    }
}
