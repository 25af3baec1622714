//! Serializable render result of a whole entry.

use super::sanitize::SanitizedHtml;
use serde::Serialize;

/// An entry body rendered for display, together with its asset information.
///
/// Serialized to JSON for consumers outside of the process.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedEntry {
    /// The sanitized HTML, ready for direct DOM injection.
    pub html: SanitizedHtml,
    /// Server-side assets referenced by the body, in order of first appearance.
    pub assets: Vec<String>,
    /// URL of the first non-video image, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
}

#[cfg(test)]
mod tests {
    use crate::assets::AssetUrlResolver;
    use crate::render::AssetAwareRenderer;

    #[test]
    fn test_serde_rendered_entry() {
        let renderer = AssetAwareRenderer::new(AssetUrlResolver::path("https://h/assets"));
        let entry = renderer.render_entry("Hello\n\n![](a.jpg)");
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["assets"], serde_json::json!(["a.jpg"]));
        assert_eq!(json["featured_image"], "https://h/assets/a.jpg");
        assert!(json["html"]
            .as_str()
            .unwrap()
            .contains(r#"<img src="https://h/assets/a.jpg" alt="">"#));
    }

    #[test]
    fn test_serde_skips_missing_featured_image() {
        let renderer = AssetAwareRenderer::new(AssetUrlResolver::path("https://h/assets"));
        let entry = renderer.render_entry("Just text");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("featured_image"));
        assert!(json.contains(r#""assets":[]"#));
    }
}
