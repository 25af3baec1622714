//! Asset classification and URL resolution.
//!
//! Entry bodies reference server-stored media by bare filename. This module
//! decides whether a reference names an image or a video and turns a bare
//! filename into an absolute, fetchable URL.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Extensions rendered with `<video>`.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg", "mov", "avi"];

/// Extensions known to be images.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "bmp", "svg"];

/// Everything but the RFC 3986 unreserved characters is escaped.
const ASSET_REF: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Path segments stay separated by `/`.
const ASSET_PATH: &AsciiSet = &ASSET_REF.remove(b'/');

/// Kind of media an asset reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Image,
    Video,
    /// Neither a known image nor a known video extension.
    ///
    /// Rendered as an image.
    Unknown,
}

impl AssetKind {
    pub fn is_video(self) -> bool {
        matches!(self, Self::Video)
    }
}

/// Returns the lowercased extension of `reference`, i.e. everything after the last `.`.
pub fn extension(reference: &str) -> Option<String> {
    reference
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

/// Classifies an asset reference by its file extension, case-insensitively.
///
/// ```
/// use journal_render::assets::{classify, AssetKind};
///
/// assert_eq!(classify("clip.MP4"), AssetKind::Video);
/// assert_eq!(classify("photo.jpg"), AssetKind::Image);
/// assert_eq!(classify("notes"), AssetKind::Unknown);
/// ```
pub fn classify(reference: &str) -> AssetKind {
    match extension(reference) {
        Some(ext) if VIDEO_EXTENSIONS.contains(&ext.as_str()) => AssetKind::Video,
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext.as_str()) => AssetKind::Image,
        _ => AssetKind::Unknown,
    }
}

/// Returns `true` if the reference is an externally hosted `http(s)` URL.
pub fn is_absolute_url(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

/// How a bare asset filename is attached to the asset base URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetUrlScheme {
    /// `{base}/{ref}`, the static web assets path.
    #[default]
    Path,
    /// `{base}?path={ref}`, the `/assets` API endpoint.
    Query,
}

impl FromStr for AssetUrlScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "path" => Ok(Self::Path),
            "query" => Ok(Self::Query),
            other => Err(format!("unknown asset url scheme: {other}")),
        }
    }
}

/// Resolves bare asset references against the asset base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUrlResolver {
    base_url: String,
    scheme: AssetUrlScheme,
}

impl AssetUrlResolver {
    pub fn new(base_url: impl Into<String>, scheme: AssetUrlScheme) -> Self {
        let mut base_url = base_url.into();
        if scheme == AssetUrlScheme::Path {
            while base_url.ends_with('/') {
                base_url.pop();
            }
        }
        Self { base_url, scheme }
    }

    /// Resolver using the `{base}/{ref}` scheme.
    pub fn path(base_url: impl Into<String>) -> Self {
        Self::new(base_url, AssetUrlScheme::Path)
    }

    /// Resolver using the `{base}?path={ref}` scheme.
    pub fn query(base_url: impl Into<String>) -> Self {
        Self::new(base_url, AssetUrlScheme::Query)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn scheme(&self) -> AssetUrlScheme {
        self.scheme
    }

    /// Returns the absolute URL of `reference`.
    ///
    /// Absolute `http(s)` references are returned untouched. The reference is
    /// percent-encoded in both schemes so spaces and parentheses survive the
    /// markdown parser, `/` is only escaped inside the query.
    ///
    /// ```
    /// use journal_render::assets::AssetUrlResolver;
    ///
    /// let resolver = AssetUrlResolver::query("https://example.com/v1/assets");
    /// assert_eq!(
    ///     resolver.resolve("my photo.jpg"),
    ///     "https://example.com/v1/assets?path=my%20photo.jpg"
    /// );
    /// ```
    pub fn resolve(&self, reference: &str) -> String {
        if is_absolute_url(reference) {
            return reference.to_string();
        }

        match self.scheme {
            AssetUrlScheme::Path => format!(
                "{}/{}",
                self.base_url,
                utf8_percent_encode(reference, ASSET_PATH)
            ),
            AssetUrlScheme::Query => format!(
                "{}?path={}",
                self.base_url,
                utf8_percent_encode(reference, ASSET_REF)
            ),
        }
    }
}
