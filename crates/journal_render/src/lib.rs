//! Rendering of journal entry bodies.
//!
//! Entry bodies are markdown that embed uploaded media through image syntax,
//! `![alt](photo.jpg)`. This crate turns such a body into sanitized HTML in
//! which every bare asset filename points at an absolute URL and every video
//! is shown with a `<video>` element.
//!
//! # Modules
//!
//! - [`assets`] - Asset classification (image / video) and URL resolution
//! - [`references`] - Finding, appending and removing asset references
//! - [`render`] - The rewrite, parse and sanitize pipeline

pub mod assets;
pub mod references;
pub mod render;

// Re-export commonly used types at crate root
pub use assets::{classify, AssetKind, AssetUrlResolver, AssetUrlScheme};
pub use references::{
    append_references, collect_media, extract_references, featured_image, remove_reference,
    MediaItem,
};
pub use render::{
    render, AssetAwareRenderer, CommonMarkParser, MarkdownOptions, MarkdownParser, PolicyError,
    RenderedEntry, SanitizationPolicy, SanitizedHtml,
};
