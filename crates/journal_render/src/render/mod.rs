//! Asset-aware markdown rendering.
//!
//! Rendering an entry body is a three step pipeline:
//!
//! 1. Asset links are rewritten: bare filenames in `![alt](ref)` become
//!    absolute URLs, video references become `<video>` blocks.
//! 2. The rewritten text is parsed as GitHub Flavored Markdown.
//! 3. The HTML is sanitized against a [`SanitizationPolicy`].
//!
//! Every step is a pure function of its inputs, the output is regenerated
//! from scratch on each call.

mod output;
mod parser;
mod sanitize;

use crate::assets::{classify, extension, is_absolute_url, AssetKind, AssetUrlResolver};
use crate::references::{self, IMAGE_REF};
use pulldown_cmark_escape::escape_href;

pub use output::RenderedEntry;
pub use parser::{CommonMarkParser, MarkdownOptions, MarkdownParser};
pub use sanitize::{
    sanitize, PolicyError, SanitizationPolicy, SanitizedHtml, DEFAULT_ALLOWED_ATTRIBUTES,
    DEFAULT_ALLOWED_TAGS,
};

/// Escapes `url` the way the markdown renderer escapes `src` and `href` values.
///
/// The result has no whitespace, quotes or angle brackets left, so it fits both
/// a double-quoted attribute and a `<...>` link destination.
fn escape_url(url: &str) -> String {
    let mut escaped = String::with_capacity(url.len());
    // Writing into a `String` never fails.
    let _ = escape_href(&mut escaped, url);
    escaped
}

/// Rewrites the asset links of `body` ahead of markdown parsing.
///
/// Absolute `http(s)` references are left alone. Video references are
/// replaced with a raw `<video controls>` block, every other reference keeps
/// the image syntax with its target resolved against `resolver`.
///
/// ```
/// use journal_render::assets::AssetUrlResolver;
/// use journal_render::render::rewrite_asset_links;
///
/// let resolver = AssetUrlResolver::path("https://example.com/assets");
/// assert_eq!(
///     rewrite_asset_links("![cat](cat.png)", &resolver),
///     "![cat](<https://example.com/assets/cat.png>)"
/// );
/// ```
pub fn rewrite_asset_links(body: &str, resolver: &AssetUrlResolver) -> String {
    IMAGE_REF
        .replace_all(body, |caps: &regex::Captures| {
            let alt_text = &caps[1];
            let reference = &caps[2];

            if is_absolute_url(reference) {
                return caps[0].to_string();
            }

            let url = escape_url(&resolver.resolve(reference));

            match (classify(reference), extension(reference)) {
                (AssetKind::Video, Some(ext)) => {
                    tracing::trace!(reference, %url, "Rewriting video reference");
                    format!(
                        r#"<video controls><source src="{url}" type="video/{ext}"></video>"#
                    )
                }
                _ => {
                    tracing::trace!(reference, %url, "Rewriting image reference");
                    format!("![{alt_text}](<{url}>)")
                }
            }
        })
        .into_owned()
}

/// Renders `raw_body` with GitHub Flavored Markdown options.
///
/// Shorthand for building an [`AssetAwareRenderer`] and calling
/// [`AssetAwareRenderer::render`].
pub fn render(
    raw_body: &str,
    resolver: &AssetUrlResolver,
    policy: &SanitizationPolicy,
) -> SanitizedHtml {
    if raw_body.is_empty() {
        return SanitizedHtml::default();
    }
    let rewritten = rewrite_asset_links(raw_body, resolver);
    let html = CommonMarkParser::default().parse(&rewritten);
    sanitize(&html, policy)
}

/// Renders entry bodies into sanitized HTML.
///
/// Holds everything the pipeline depends on, the asset base URL included,
/// so rendering needs no ambient state. Cheap to share across threads.
#[derive(Debug, Clone)]
pub struct AssetAwareRenderer<P = CommonMarkParser> {
    resolver: AssetUrlResolver,
    policy: SanitizationPolicy,
    parser: P,
}

impl AssetAwareRenderer<CommonMarkParser> {
    /// Creates a renderer with the default policy and GFM options.
    pub fn new(resolver: AssetUrlResolver) -> Self {
        Self::with_parser(resolver, SanitizationPolicy::default(), CommonMarkParser::default())
    }

    pub fn with_options(
        resolver: AssetUrlResolver,
        policy: SanitizationPolicy,
        options: MarkdownOptions,
    ) -> Self {
        Self::with_parser(resolver, policy, CommonMarkParser::new(options))
    }
}

impl<P: MarkdownParser> AssetAwareRenderer<P> {
    pub fn with_parser(resolver: AssetUrlResolver, policy: SanitizationPolicy, parser: P) -> Self {
        Self {
            resolver,
            policy,
            parser,
        }
    }

    pub fn resolver(&self) -> &AssetUrlResolver {
        &self.resolver
    }

    pub fn policy(&self) -> &SanitizationPolicy {
        &self.policy
    }

    /// Renders `raw_body` into HTML that is safe to inject into a page.
    ///
    /// Never fails: malformed markdown renders best-effort and is sanitized
    /// like anything else.
    ///
    /// ```
    /// use journal_render::assets::AssetUrlResolver;
    /// use journal_render::render::AssetAwareRenderer;
    ///
    /// let renderer = AssetAwareRenderer::new(AssetUrlResolver::path("https://example.com/assets"));
    /// let html = renderer.render("**bold** <script>alert(1)</script>");
    /// assert!(html.as_str().contains("<strong>bold</strong>"));
    /// assert!(!html.as_str().contains("<script>"));
    /// ```
    pub fn render(&self, raw_body: &str) -> SanitizedHtml {
        if raw_body.is_empty() {
            return SanitizedHtml::default();
        }

        let rewritten = rewrite_asset_links(raw_body, &self.resolver);
        let html = self.parser.parse(&rewritten);
        let sanitized = sanitize(&html, &self.policy);

        tracing::debug!(
            input_len = raw_body.len(),
            parsed_len = html.len(),
            output_len = sanitized.as_str().len(),
            "Rendered entry body"
        );

        sanitized
    }

    /// Renders `raw_body` along with the asset information of the entry.
    pub fn render_entry(&self, raw_body: &str) -> RenderedEntry {
        RenderedEntry {
            html: self.render(raw_body),
            assets: references::extract_references(raw_body),
            featured_image: references::featured_image(raw_body, &self.resolver),
        }
    }
}
