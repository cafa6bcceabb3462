use serde::{Deserialize, Serialize};

use movebot_core::types::Provider;

/// Broad media class derived from the content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Document,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Document => "document",
        }
    }

    /// Classify a MIME content type. Unknown types land in `Document`.
    pub fn from_content_type(content_type: &str) -> Self {
        let ct = content_type.to_ascii_lowercase();
        if ct.starts_with("image/") {
            MediaKind::Image
        } else if ct.starts_with("video/") {
            MediaKind::Video
        } else if ct.starts_with("audio/") {
            MediaKind::Audio
        } else {
            MediaKind::Document
        }
    }

    /// Extension used in the object key.
    pub fn extension_for(content_type: &str) -> &'static str {
        match content_type.to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            "video/mp4" => "mp4",
            "video/quicktime" => "mov",
            "audio/ogg" => "ogg",
            "audio/mpeg" => "mp3",
            "application/pdf" => "pdf",
            _ => "bin",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ingested media object. Keys are UUID-based; no public URLs are ever
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAsset {
    pub id: String,
    pub tenant_id: String,
    pub lead_id: Option<String>,
    pub chat_id: String,
    pub provider: Provider,
    pub kind: MediaKind,
    pub content_type: String,
    pub size_bytes: u64,
    pub s3_key: String,
    pub expires_at: Option<String>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_from_content_type() {
        assert_eq!(MediaKind::from_content_type("image/jpeg"), MediaKind::Image);
        assert_eq!(MediaKind::from_content_type("VIDEO/MP4"), MediaKind::Video);
        assert_eq!(MediaKind::from_content_type("audio/ogg"), MediaKind::Audio);
        assert_eq!(
            MediaKind::from_content_type("application/zip"),
            MediaKind::Document
        );
    }

    #[test]
    fn extension_mapping() {
        assert_eq!(MediaKind::extension_for("image/jpeg"), "jpg");
        assert_eq!(MediaKind::extension_for("video/mp4"), "mp4");
        assert_eq!(MediaKind::extension_for("application/x-unknown"), "bin");
    }
}
