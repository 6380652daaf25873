/*!
 * Binary and size classification for file descriptors
 */

use std::path::Path;

use crate::types::SkipReason;

/// Files larger than this are never read as text (10 MiB)
pub const MAX_TEXT_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Type tags treated as binary, matched exactly or as a prefix
const BINARY_TYPES: &[&str] = &[
    "application/octet-stream",
    "application/zip",
    "application/x-zip-compressed",
    "application/pdf",
    "application/x-msdownload",
    "application/x-executable",
    "image/",
    "audio/",
    "video/",
];

/// Outcome of classifying a file descriptor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Classification {
    pub binary: bool,
    pub oversized: bool,
}

impl Classification {
    /// Whether the content should be read as text
    pub fn is_textual(&self) -> bool {
        !self.binary && !self.oversized
    }

    /// Reason the content is skipped, binary taking precedence
    pub fn skip_reason(&self) -> Option<SkipReason> {
        if self.binary {
            Some(SkipReason::Binary)
        } else if self.oversized {
            Some(SkipReason::Oversized)
        } else {
            None
        }
    }
}

/// Classify a file from its size and optional type tag
pub fn classify(size: u64, mime_type: Option<&str>) -> Classification {
    Classification {
        binary: mime_type.is_some_and(is_binary_type),
        oversized: size > MAX_TEXT_FILE_SIZE,
    }
}

/// Check a type tag against the binary list
pub fn is_binary_type(mime_type: &str) -> bool {
    let mime_type = mime_type.trim().to_ascii_lowercase();
    !mime_type.is_empty() && BINARY_TYPES.iter().any(|t| mime_type.starts_with(t))
}

/// Guess a type tag from a file extension
///
/// Only used for sources that carry no type tag of their own, such as the
/// local filesystem. Unknown extensions yield `None`, which the classifier
/// treats as text.
pub fn mime_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        // Images
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        // Audio and video
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        // Archives and documents
        "zip" => "application/zip",
        "pdf" => "application/pdf",
        "exe" | "dll" => "application/x-msdownload",
        "bin" | "so" | "o" | "a" | "class" | "wasm" | "dylib" => "application/octet-stream",
        // Text
        "txt" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "js" | "mjs" | "cjs" | "jsx" => "text/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "toml" => "application/toml",
        "yaml" | "yml" => "application/yaml",
        _ => return None,
    };
    Some(mime)
}
