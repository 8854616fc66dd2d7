use serde::Serialize;
use std::path::Path;

/// MIME types accepted as the declared content type of an upload.
/// `image/jpg` is non-standard but sent by some browsers for `.jpg` files.
pub const UPLOAD_MIMES: &[&str] = &[
    // Image
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/bmp",
    // Video
    "video/mp4",
    "video/webm",
    "video/quicktime",
];

/// Gallery classification of a media file. Serialized as `"image"` / `"video"`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

/// Classify a file path by its extension into a (MediaKind, MIME type) pair.
///
/// Returns `None` for extensions outside the allow-list (silent skip, no logging at this layer).
/// Extensions are matched case-insensitively.
pub fn classify(path: &Path) -> Option<(MediaKind, &'static str)> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();

    let result = match ext.as_str() {
        // Image
        "jpg" => (MediaKind::Image, "image/jpeg"),
        "jpeg" => (MediaKind::Image, "image/jpeg"),
        "png" => (MediaKind::Image, "image/png"),
        "gif" => (MediaKind::Image, "image/gif"),
        "webp" => (MediaKind::Image, "image/webp"),
        "bmp" => (MediaKind::Image, "image/bmp"),

        // Video
        "mp4" => (MediaKind::Video, "video/mp4"),
        "webm" => (MediaKind::Video, "video/webm"),
        "mov" => (MediaKind::Video, "video/quicktime"),

        _ => return None,
    };

    Some(result)
}

/// Classify a declared content type (e.g. from a multipart part header).
/// Parameters such as `; charset=...` are ignored; matching is case-insensitive.
pub fn classify_mime(content_type: &str) -> Option<MediaKind> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    let accepted = UPLOAD_MIMES.iter().any(|m| *m == essence);
    if !accepted {
        return None;
    }
    if essence.starts_with("image/") {
        Some(MediaKind::Image)
    } else {
        Some(MediaKind::Video)
    }
}
