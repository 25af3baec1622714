//! HTML sanitization and the trusted-HTML boundary.
//!
//! [`SanitizedHtml`] can only come out of [`sanitize`], which runs the HTML
//! through `ammonia` configured from a [`SanitizationPolicy`].

use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

/// Tags that survive sanitization by default.
pub const DEFAULT_ALLOWED_TAGS: &[&str] = &[
    "p",
    "br",
    "strong",
    "em",
    "u",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "ul",
    "ol",
    "li",
    "blockquote",
    "code",
    "pre",
    "a",
    "img",
    "video",
    "source",
    "table",
    "thead",
    "tbody",
    "tr",
    "th",
    "td",
    "hr",
];

/// Attributes that survive sanitization by default, on any allowed tag.
pub const DEFAULT_ALLOWED_ATTRIBUTES: &[&str] = &[
    "href", "title", "src", "alt", "controls", "type", "colspan", "rowspan",
];

/// Tags that can execute script or pull in foreign documents.
const FORBIDDEN_TAGS: &[&str] = &["script", "style", "iframe", "object", "embed"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("tag `{0}` can not be allowed by the sanitization policy")]
    ForbiddenTag(String),

    #[error("attribute `{0}` can not be allowed by the sanitization policy")]
    ForbiddenAttribute(String),
}

/// Allow-list applied to rendered HTML.
///
/// A policy never admits script execution vectors: constructing one that
/// lists a forbidden tag, an `on*` event handler or an explicit `data-*`
/// attribute fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizationPolicy {
    allowed_tags: BTreeSet<String>,
    allowed_attributes: BTreeSet<String>,
    allow_data_attributes: bool,
}

impl Default for SanitizationPolicy {
    fn default() -> Self {
        Self {
            allowed_tags: DEFAULT_ALLOWED_TAGS.iter().map(|s| s.to_string()).collect(),
            allowed_attributes: DEFAULT_ALLOWED_ATTRIBUTES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            allow_data_attributes: false,
        }
    }
}

impl SanitizationPolicy {
    pub fn new<T, A>(
        allowed_tags: impl IntoIterator<Item = T>,
        allowed_attributes: impl IntoIterator<Item = A>,
        allow_data_attributes: bool,
    ) -> Result<Self, PolicyError>
    where
        T: AsRef<str>,
        A: AsRef<str>,
    {
        let allowed_tags = allowed_tags
            .into_iter()
            .map(|tag| tag.as_ref().trim().to_ascii_lowercase())
            .collect::<BTreeSet<_>>();
        let allowed_attributes = allowed_attributes
            .into_iter()
            .map(|attr| attr.as_ref().trim().to_ascii_lowercase())
            .collect::<BTreeSet<_>>();

        if let Some(tag) = allowed_tags
            .iter()
            .find(|tag| FORBIDDEN_TAGS.contains(&tag.as_str()))
        {
            return Err(PolicyError::ForbiddenTag(tag.clone()));
        }

        if let Some(attr) = allowed_attributes
            .iter()
            .find(|attr| attr.starts_with("on") || attr.starts_with("data-"))
        {
            return Err(PolicyError::ForbiddenAttribute(attr.clone()));
        }

        Ok(Self {
            allowed_tags,
            allowed_attributes,
            allow_data_attributes,
        })
    }

    pub fn allowed_tags(&self) -> impl Iterator<Item = &str> {
        self.allowed_tags.iter().map(String::as_str)
    }

    pub fn allowed_attributes(&self) -> impl Iterator<Item = &str> {
        self.allowed_attributes.iter().map(String::as_str)
    }

    pub fn allow_data_attributes(&self) -> bool {
        self.allow_data_attributes
    }

    fn builder(&self) -> ammonia::Builder<'_> {
        let mut builder = ammonia::Builder::default();

        builder
            .tags(self.allowed_tags().collect::<HashSet<_>>())
            .tag_attributes(HashMap::new())
            .generic_attributes(self.allowed_attributes().collect::<HashSet<_>>());

        if self.allow_data_attributes {
            builder.generic_attribute_prefixes(HashSet::from(["data-"]));
        }

        // ammonia manages `rel` itself unless the policy takes it over.
        if self.allowed_attributes.contains("rel") {
            builder.link_rel(None);
        }

        builder
    }
}

/// HTML that has passed [`sanitize`] and may be injected into a page as is.
///
/// Consumers must not escape or sanitize it again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SanitizedHtml(String);

impl SanitizedHtml {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SanitizedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strips everything outside `policy` from `html`.
///
/// `<script>` and `<style>` are dropped together with their content, event
/// handler attributes and unsafe URL schemes never survive.
pub fn sanitize(html: &str, policy: &SanitizationPolicy) -> SanitizedHtml {
    if html.is_empty() {
        return SanitizedHtml::default();
    }

    SanitizedHtml(policy.builder().clean(html).to_string())
}
