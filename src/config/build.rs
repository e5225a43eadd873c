//! `[build]` section configuration.
//!
//! Paths the host pipeline reads from and writes to.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in partials.toml - pipeline paths.
///
/// # Example
/// ```toml
/// [build]
/// source = "src"   # Documents and the partials directory
/// output = "out"   # Written pages
/// clean = true     # Clear output before building
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (usually set via CLI `--root`).
    #[serde(default = "defaults::build::root")]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Source root. Partials are discovered below it.
    #[serde(default = "defaults::build::source")]
    #[educe(Default = defaults::build::source())]
    pub source: PathBuf,

    /// Build output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Clear output directory before each build.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub clean: bool,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::Path;

    #[test]
    fn test_build_config() {
        let config = r#"
            [build]
            source = "content"
            output = "public"
            clean = true
        "#;
        let config = SiteConfig::from_str(config).unwrap();

        assert_eq!(config.build.source, Path::new("content"));
        assert_eq!(config.build.output, Path::new("public"));
        assert!(config.build.clean);
    }

    #[test]
    fn test_build_config_defaults() {
        let config = SiteConfig::from_str("").unwrap();

        assert!(config.build.root.is_none());
        assert_eq!(config.build.source, Path::new("src"));
        assert_eq!(config.build.output, Path::new("out"));
        assert!(!config.build.clean);
    }

    #[test]
    fn test_unknown_field_rejection() {
        let config = r#"
            [build]
            content = "content"
        "#;
        assert!(SiteConfig::from_str(config).is_err());
    }
}
