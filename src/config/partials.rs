//! `[partials]` section configuration.
//!
//! Controls where partials are discovered and which of them need per-call
//! templated rendering.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[partials]` section in partials.toml.
///
/// # Example
/// ```toml
/// [partials]
/// dir = "partials"          # <source>/partials
/// generated = "generated"   # <source>/partials/generated, erased after writing
/// extensions = ["tpl"]      # rendered per call with the caller's data
/// settle = false
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct PartialsConfig {
    /// Partials root, relative to `[build.source]`.
    #[serde(default = "defaults::partials::dir")]
    #[educe(Default = defaults::partials::dir())]
    pub dir: PathBuf,

    /// Generated-artifacts directory, relative to the partials root.
    #[serde(default = "defaults::partials::generated")]
    #[educe(Default = defaults::partials::generated())]
    pub generated: PathBuf,

    /// Extensions that require templating evaluation.
    ///
    /// A partial carrying any of these is rendered once per call with the
    /// caller's data; every other partial is rendered once per build and cached.
    #[serde(default = "defaults::partials::extensions")]
    #[educe(Default = defaults::partials::extensions())]
    pub extensions: Vec<String>,

    /// Await background renders of cacheable partials before the post-render
    /// sweep. When false, a sweep that outruns a render substitutes "".
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub settle: bool,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::Path;

    #[test]
    fn test_partials_config() {
        let config = r#"
            [partials]
            dir = "fragments"
            extensions = ["tpl", "md"]
            settle = true
        "#;
        let config = SiteConfig::from_str(config).unwrap();

        assert_eq!(config.partials.dir, Path::new("fragments"));
        assert_eq!(config.partials.generated, Path::new("generated"));
        assert_eq!(config.partials.extensions, vec!["tpl", "md"]);
        assert!(config.partials.settle);
    }

    #[test]
    fn test_partials_config_defaults() {
        let config = SiteConfig::from_str("").unwrap();

        assert_eq!(config.partials.dir, Path::new("partials"));
        assert_eq!(config.partials.extensions, vec!["tpl"]);
        assert!(!config.partials.settle);
    }

    #[test]
    fn test_empty_extensions_allowed() {
        let config = SiteConfig::from_str("[partials]\nextensions = []").unwrap();
        assert!(config.partials.extensions.is_empty());
    }
}
