//! Partial resolution for tola sites.
//!
//! Locates reusable fragments ("partials"), renders them apart from the
//! documents that reference them and splices the output back in place.
//! See [`partials`] for the two-phase token protocol.

pub mod build;
pub mod cli;
pub mod config;
pub mod host;
pub mod logger;
pub mod partials;
