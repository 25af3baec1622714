//! Asset references embedded in entry bodies.
//!
//! Media is attached to an entry as markdown image syntax, `![alt](ref)`,
//! where `ref` is either an absolute URL or the filename the server stored
//! the upload under. The helpers here find, add and remove such references
//! without touching the rest of the body.

use crate::assets::{classify, is_absolute_url, AssetKind, AssetUrlResolver};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;

/// `![alt](ref)`, the alt text and the reference are captured.
pub(crate) static IMAGE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\(([^)]+)\)").unwrap());

/// One `![alt](ref)` mention inside an entry body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference<'a> {
    pub alt_text: &'a str,
    pub reference: &'a str,
    /// Byte range of the whole token in the body.
    pub span: Range<usize>,
}

impl AssetReference<'_> {
    pub fn kind(&self) -> AssetKind {
        classify(self.reference)
    }

    pub fn is_absolute(&self) -> bool {
        is_absolute_url(self.reference)
    }
}

/// Iterates over every `![alt](ref)` token in `body`, in document order.
pub fn scan(body: &str) -> impl Iterator<Item = AssetReference<'_>> {
    IMAGE_REF.captures_iter(body).filter_map(|caps| {
        let whole = caps.get(0)?;
        Some(AssetReference {
            alt_text: caps.get(1).map_or("", |m| m.as_str()),
            reference: caps.get(2)?.as_str(),
            span: whole.range(),
        })
    })
}

/// Returns the server-side assets referenced by `body`.
///
/// Absolute URLs are skipped, duplicates are dropped and the order of first
/// appearance is kept.
///
/// ```
/// use journal_render::references::extract_references;
///
/// let refs = extract_references("![](a.jpg)\n![](http://x/b.png)\n![](c.jpg)\n![](a.jpg)");
/// assert_eq!(refs, vec!["a.jpg", "c.jpg"]);
/// ```
pub fn extract_references(body: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    scan(body)
        .filter(|asset_ref| !asset_ref.is_absolute())
        .filter(|asset_ref| seen.insert(asset_ref.reference))
        .map(|asset_ref| asset_ref.reference.to_string())
        .collect()
}

/// Appends one `![](ref)` line per reference, each separated from the
/// preceding content by a blank line.
///
/// Returns `body` unchanged if `refs` is empty.
///
/// ```
/// use journal_render::references::append_references;
///
/// assert_eq!(
///     append_references("Hello", &["a.jpg", "b.jpg"]),
///     "Hello\n\n![](a.jpg)\n\n![](b.jpg)"
/// );
/// ```
pub fn append_references<S: AsRef<str>>(body: &str, refs: &[S]) -> String {
    let mut result = body.to_string();

    for reference in refs {
        if !result.is_empty() {
            while !result.ends_with("\n\n") {
                result.push('\n');
            }
        }
        result.push_str("![](");
        result.push_str(reference.as_ref());
        result.push(')');
    }

    result
}

/// Removes every `![any alt](reference)` token from `body`, along with the
/// newlines directly following it.
pub fn remove_reference(body: &str, reference: &str) -> String {
    let mut result = String::with_capacity(body.len());
    let mut last = 0;

    for asset_ref in scan(body).filter(|asset_ref| asset_ref.reference == reference) {
        if asset_ref.span.start < last {
            continue;
        }
        result.push_str(&body[last..asset_ref.span.start]);
        let rest = &body[asset_ref.span.end..];
        last = asset_ref.span.end + (rest.len() - rest.trim_start_matches('\n').len());
    }

    result.push_str(&body[last..]);
    result
}

/// A media attachment of an entry, as listed in a gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub reference: String,
    pub kind: AssetKind,
    pub url: String,
}

/// Lists every distinct media reference of `body`, absolute ones included,
/// together with its kind and resolved URL.
pub fn collect_media(body: &str, resolver: &AssetUrlResolver) -> Vec<MediaItem> {
    let mut seen = HashSet::new();
    scan(body)
        .filter(|asset_ref| seen.insert(asset_ref.reference))
        .map(|asset_ref| MediaItem {
            reference: asset_ref.reference.to_string(),
            kind: asset_ref.kind(),
            url: resolver.resolve(asset_ref.reference),
        })
        .collect()
}

/// Picks the image to feature for an entry: the first reference in document
/// order that is not a video.
pub fn featured_image(body: &str, resolver: &AssetUrlResolver) -> Option<String> {
    scan(body)
        .find(|asset_ref| !asset_ref.kind().is_video())
        .map(|asset_ref| resolver.resolve(asset_ref.reference))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> AssetUrlResolver {
        AssetUrlResolver::path("https://journal.example.com/web/assets")
    }

    #[test]
    fn test_scan_captures_alt_and_reference() {
        let body = "before ![a cat](cat.png) after";
        let refs: Vec<_> = scan(body).collect();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].alt_text, "a cat");
        assert_eq!(refs[0].reference, "cat.png");
        assert_eq!(&body[refs[0].span.clone()], "![a cat](cat.png)");
    }

    #[test]
    fn test_scan_stops_at_first_closing_paren() {
        let refs: Vec<_> = scan("![](my photo (1).jpg)").collect();
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].reference, "my photo (1");
    }

    #[test]
    fn test_extract_references() {
        let refs = extract_references("![](a.jpg)\n![](http://x/b.png)\n![](c.jpg)");
        assert_eq!(refs, vec!["a.jpg", "c.jpg"]);
    }

    #[test]
    fn test_extract_references_dedup_keeps_first_order() {
        let refs = extract_references("![x](b.mp4) ![y](a.jpg) ![z](b.mp4) ![](https://h/c.png)");
        assert_eq!(refs, vec!["b.mp4", "a.jpg"]);
    }

    #[test]
    fn test_extract_references_empty() {
        assert!(extract_references("").is_empty());
        assert!(extract_references("[link](a.jpg) and text").is_empty());
    }

    #[test]
    fn test_append_references() {
        assert_eq!(
            append_references("Hello", &["a.jpg", "b.jpg"]),
            "Hello\n\n![](a.jpg)\n\n![](b.jpg)"
        );
        assert_eq!(append_references("Hello\n", &["a.jpg"]), "Hello\n\n![](a.jpg)");
        assert_eq!(append_references("", &["a.jpg"]), "![](a.jpg)");
    }

    #[test]
    fn test_append_no_refs_is_noop() {
        let empty: &[&str] = &[];
        assert_eq!(append_references("Hello", empty), "Hello");
        assert_eq!(append_references("", empty), "");
    }

    #[test]
    fn test_remove_reference() {
        let body = "a\n\n![](x.jpg)\n\nb ![alt](y.png)";
        let removed = remove_reference(body, "x.jpg");
        assert_eq!(removed, "a\n\nb ![alt](y.png)");
    }

    #[test]
    fn test_remove_reference_all_occurrences() {
        let body = "![one](x.jpg)\n![two](x.jpg)\ntext";
        assert_eq!(remove_reference(body, "x.jpg"), "text");
        assert_eq!(remove_reference(body, "missing.jpg"), body);
    }

    #[test]
    fn test_featured_image_skips_videos() {
        let body = "![](v.mp4)\n![](p.png)\n![](q.jpg)";
        assert_eq!(
            featured_image(body, &resolver()),
            Some("https://journal.example.com/web/assets/p.png".to_string())
        );
        assert_eq!(featured_image("![](only.webm)", &resolver()), None);
        assert_eq!(featured_image("no media", &resolver()), None);
    }

    #[test]
    fn test_featured_image_keeps_absolute_urls() {
        let body = "![](https://cdn.example.com/a.png)\n![](b.png)";
        assert_eq!(
            featured_image(body, &resolver()),
            Some("https://cdn.example.com/a.png".to_string())
        );
    }

    #[test]
    fn test_collect_media() {
        let body = "![](a.jpg) ![](clip.MP4) ![](a.jpg) ![](https://h/x)";
        let media = collect_media(body, &resolver());
        assert_eq!(media.len(), 3);
        assert_eq!(media[0].kind, AssetKind::Image);
        assert_eq!(media[1].kind, AssetKind::Video);
        assert_eq!(
            media[1].url,
            "https://journal.example.com/web/assets/clip.MP4"
        );
        assert_eq!(media[2].kind, AssetKind::Unknown);
        assert_eq!(media[2].url, "https://h/x");
    }
}
