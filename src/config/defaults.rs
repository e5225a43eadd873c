//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn source() -> PathBuf {
        "src".into()
    }

    pub fn output() -> PathBuf {
        "out".into()
    }
}

// ============================================================================
// [partials] Section Defaults
// ============================================================================

pub mod partials {
    use std::path::PathBuf;

    pub fn dir() -> PathBuf {
        "partials".into()
    }

    pub fn generated() -> PathBuf {
        "generated".into()
    }

    /// The built-in template extension handled by `TemplateRenderer`.
    pub fn extensions() -> Vec<String> {
        vec!["tpl".into()]
    }
}
