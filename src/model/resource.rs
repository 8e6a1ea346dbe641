//! The resource: one extractable unit of an MHTML archive.

use serde::{Deserialize, Serialize};

/// Where a resource was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceSource {
    /// Came from a MIME part of the archive.
    Embedded,
    /// Script text found inside a `<script>` element without `src`.
    Inline,
    /// Downloaded from a `<script src="http…">` URL.
    External,
}

impl ResourceSource {
    /// Lowercase label used in listings.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Embedded => "embedded",
            Self::Inline => "inline",
            Self::External => "external",
        }
    }
}

impl std::fmt::Display for ResourceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A resource recovered from an archive.
///
/// The payload is captured once and never modified; [`Resource::size`] is
/// always its length.
#[derive(Debug, Clone, Serialize)]
pub struct Resource {
    /// Lowercase MIME type (e.g. `"image/png"`).
    pub content_type: String,

    /// Proposed file name: the declared one, or a synthesized one.
    pub filename: String,

    /// Discovery origin.
    pub source: ResourceSource,

    /// `Content-Location` of an embedded part, or the URL of an external script.
    pub location: Option<String>,

    /// Raw payload. Left out of serialized listings.
    #[serde(skip)]
    data: Vec<u8>,
}

impl Resource {
    pub fn new(
        content_type: impl Into<String>,
        filename: impl Into<String>,
        source: ResourceSource,
        data: Vec<u8>,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            filename: filename.into(),
            source,
            location: None,
            data,
        }
    }

    /// Attach the original location of the resource.
    pub fn with_location(mut self, location: Option<String>) -> Self {
        self.location = location;
        self
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Payload length in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Listing row handed to presentation layers (`--json`, tables).
#[derive(Debug, Clone, Serialize)]
pub struct ResourceSummary<'a> {
    pub index: usize,
    #[serde(rename = "type")]
    pub content_type: &'a str,
    pub filename: &'a str,
    pub size: u64,
    pub source: ResourceSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<&'a str>,
}

impl<'a> ResourceSummary<'a> {
    pub fn new(index: usize, resource: &'a Resource) -> Self {
        Self {
            index,
            content_type: &resource.content_type,
            filename: &resource.filename,
            size: resource.size(),
            source: resource.source,
            location: resource.location.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_tracks_payload() {
        let res = Resource::new("image/png", "x.png", ResourceSource::Embedded, vec![0; 42]);
        assert_eq!(res.size(), 42);
        assert_eq!(res.data().len(), 42);
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(ResourceSource::Embedded.to_string(), "embedded");
        assert_eq!(ResourceSource::Inline.to_string(), "inline");
        assert_eq!(ResourceSource::External.to_string(), "external");
    }

    #[test]
    fn test_summary_json_shape() {
        let res = Resource::new("text/css", "site.css", ResourceSource::Embedded, b"a{}".to_vec())
            .with_location(Some("https://example.com/site.css".into()));
        let json = serde_json::to_value(ResourceSummary::new(3, &res)).unwrap();
        assert_eq!(json["index"], 3);
        assert_eq!(json["type"], "text/css");
        assert_eq!(json["size"], 3);
        assert_eq!(json["source"], "embedded");
        assert_eq!(json["location"], "https://example.com/site.css");
    }

    #[test]
    fn test_serialized_resource_has_no_payload() {
        let res = Resource::new("font/woff2", "f.woff2", ResourceSource::Embedded, vec![1, 2, 3]);
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(json["filename"], "f.woff2");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_summary_omits_missing_location() {
        let res = Resource::new("text/javascript", "a.js", ResourceSource::Inline, b"1".to_vec());
        let json = serde_json::to_value(ResourceSummary::new(0, &res)).unwrap();
        assert!(json.get("location").is_none());
    }
}
