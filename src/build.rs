//! Site building orchestration.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── extend_collections()       register the `partials` live collection
//!     ├── populate_collections()     load <source>/partials
//!     ├── parse source directory     every other document
//!     │
//!     ├── render (concurrent)        per document:
//!     │       ├── extend_template_data()   install partial()
//!     │       ├── Renderer::render()       tokens embedded
//!     │       └── render_document()        [partial:<id>] resolved
//!     │
//!     ├── render_after()             [simple_partial:<name>] swept
//!     ├── write (rayon)              documents with write != false
//!     └── write_after()              <source>/partials/generated erased
//! ```

use crate::{
    config::SiteConfig,
    host::{Database, Document, Plugin, RenderContext, Renderer, TemplateData, TemplateRenderer},
    log,
    partials::{PartialsPlugin, remove_generated},
};
use anyhow::{Context, Result, anyhow};
use futures::future::join_all;
use rayon::prelude::*;
use serde_json::Value;
use std::{fs, path::Path, sync::Arc};

/// Counts reported by a finished build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub partials: usize,
    pub rendered: usize,
    pub written: usize,
}

/// Build the site: render every document, resolve partials, write output.
pub async fn build_site(config: &SiteConfig) -> Result<BuildReport> {
    let db = Database::new();
    let renderer: Arc<dyn Renderer> = Arc::new(TemplateRenderer::default());
    let partials = PartialsPlugin::new(config, Arc::clone(&renderer));
    let plugin: &dyn Plugin = &partials;

    plugin.extend_collections(&db);
    plugin.populate_collections(&db)?;
    let partials_root = config.partials_root();
    let count = db.parse_directory_except(&config.build.source, Some(&partials_root))?;
    log!("build"; "loaded {} documents", count);

    let mut documents: Vec<Document> = db
        .documents()
        .into_iter()
        .filter(Document::should_render)
        .collect();

    let results = join_all(
        documents
            .iter()
            .map(|doc| render_one(plugin, renderer.as_ref(), doc, &config.build.source)),
    )
    .await;

    let mut failed = false;
    for (doc, result) in documents.iter_mut().zip(results) {
        match result {
            Ok(content) => doc.content_rendered = Some(content),
            Err(e) => {
                failed = true;
                log!("render"; "{} failed: {:#}", doc.path.display(), e);
            }
        }
    }
    if failed {
        return Err(anyhow!("Build failed"));
    }

    plugin.render_after(&mut documents).await;

    let output = &config.build.output;
    prepare_output(output, config.build.clean)?;
    let written = write_documents(&documents, &config.build.source, output)?;

    plugin.write_after()?;
    log!("build"; "done, {} pages written", written);

    Ok(BuildReport {
        partials: partials.engine().map_or(0, |engine| engine.registry().len()),
        rendered: documents.len(),
        written,
    })
}

/// Remove generated partial artifacts without building.
pub fn clean_generated(config: &SiteConfig) -> Result<()> {
    if !remove_generated(&config.generated_dir())? {
        log!("cleanup"; "nothing to remove");
    }
    Ok(())
}

/// Render a single document and resolve its parameterized partials.
async fn render_one(
    plugin: &dyn Plugin,
    renderer: &dyn Renderer,
    doc: &Document,
    source: &Path,
) -> Result<String> {
    let mut context = RenderContext::new(document_data(doc, source));
    plugin.extend_template_data(&mut context);

    let content = renderer.render(doc, context).await?;
    Ok(plugin.render_document(doc, content).await)
}

/// Bindings every document template can use.
fn document_data(doc: &Document, source: &Path) -> TemplateData {
    let relative = doc.path.strip_prefix(source).unwrap_or(&doc.path);
    let mut data = TemplateData::new();
    data.insert("path".into(), Value::String(relative.display().to_string()));
    data.insert("name".into(), Value::String(doc.base_name().to_owned()));
    data
}

fn prepare_output(output: &Path, clean: bool) -> Result<()> {
    if clean && output.exists() {
        fs::remove_dir_all(output)
            .with_context(|| format!("Failed to clear output directory: {}", output.display()))?;
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory: {}", output.display()))
}

/// Write every writable rendered document below `output`, in parallel.
fn write_documents(documents: &[Document], source: &Path, output: &Path) -> Result<usize> {
    let writable: Vec<&Document> = documents.iter().filter(|d| d.should_write()).collect();

    writable.par_iter().try_for_each(|doc| -> Result<()> {
        let target = output.join(doc.output_relative(source));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = doc.content_rendered.as_deref().unwrap_or(&doc.content);
        fs::write(&target, content)
            .with_context(|| format!("Failed to write {}", target.display()))
    })?;

    Ok(writable.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn site(files: &[(&str, &str)]) -> (TempDir, SiteConfig) {
        let dir = TempDir::new().unwrap();
        for (path, content) in files {
            let path = dir.path().join("src").join(path);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        let mut config = SiteConfig::default();
        config.build.source = dir.path().join("src");
        config.build.output = dir.path().join("out");
        config.partials.settle = true;
        (dir, config)
    }

    fn read(dir: &TempDir, path: &str) -> String {
        fs::read_to_string(dir.path().join("out").join(path)).unwrap()
    }

    #[tokio::test]
    async fn test_build_resolves_both_partial_kinds() {
        let (dir, config) = site(&[
            (
                "index.html.tpl",
                "<body>{{ partial \"header\" }}|{{ partial \"card\" {\"title\": \"X\"} }}</body>\n",
            ),
            ("partials/header.html", "<H/>\n"),
            ("partials/card.html.tpl", "<h2>{{ title }} @ {{ name }}</h2>"),
        ]);

        let report = build_site(&config).await.unwrap();

        assert_eq!(report, BuildReport { partials: 2, rendered: 1, written: 1 });
        assert_eq!(read(&dir, "index.html"), "<body><H/>|<h2>X @ index</h2></body>\n");
    }

    #[tokio::test]
    async fn test_partials_are_not_written() {
        let (dir, config) = site(&[
            ("about.html", "about"),
            ("partials/header.html", "<H/>"),
        ]);

        build_site(&config).await.unwrap();

        assert_eq!(read(&dir, "about.html"), "about");
        assert!(!dir.path().join("out/partials").exists());
    }

    #[tokio::test]
    async fn test_missing_partial_is_inline_text() {
        let (dir, config) = site(&[("index.html.tpl", "[{{ partial \"ghost\" }}]")]);

        build_site(&config).await.unwrap();

        assert_eq!(read(&dir, "index.html"), "[Partial ghost doesn't exist]");
    }

    #[tokio::test]
    async fn test_generated_directory_removed_after_write() {
        let (dir, config) = site(&[
            ("index.html", "x"),
            ("partials/generated/cache.html", "stale"),
        ]);

        build_site(&config).await.unwrap();

        assert!(!config.generated_dir().exists());
        assert!(dir.path().join("out/index.html").exists());
    }

    #[tokio::test]
    async fn test_document_render_error_fails_build() {
        let (_dir, config) = site(&[("index.html.tpl", "{{ partial \"x\" {bad json} }}")]);

        let err = build_site(&config).await.unwrap_err();
        assert!(format!("{err}").contains("Build failed"));
    }

    #[test]
    fn test_clean_generated() {
        let (_dir, config) = site(&[("partials/generated/a.html", "a")]);

        clean_generated(&config).unwrap();
        assert!(!config.generated_dir().exists());
        clean_generated(&config).unwrap();
    }
}
