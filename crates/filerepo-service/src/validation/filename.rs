//! Filename sanitization, extension extraction and MIME guessing.

use chrono::Utc;

/// Fallback when the caller sent no filename at all.
const UNNAMED: &str = "unnamed_file";

/// Make a caller-declared filename safe to store and display.
///
/// Null bytes and `..` sequences are removed, path separators become `_`,
/// and the result is capped at `max_len` characters. A name that cleans
/// down to nothing falls back to `file_{unix_timestamp}`.
pub fn sanitize_filename(name: &str, max_len: usize) -> String {
    if name.is_empty() {
        return UNNAMED.to_string();
    }

    let cleaned = name
        .replace('\0', "")
        .replace("..", "")
        .replace(['/', '\\'], "_");
    let capped: String = cleaned.chars().take(max_len).collect();

    if capped.is_empty() || capped == "." {
        format!("file_{}", Utc::now().timestamp())
    } else {
        capped
    }
}

/// Normalized extension of a filename (`.pdf`), or `""` when there is none.
///
/// A leading dot alone does not start an extension (`.profile` has none).
pub fn extension_of(file_name: &str) -> String {
    let stem_start = file_name.len() - file_name.trim_start_matches('.').len();
    match file_name[stem_start..].rfind('.') {
        Some(idx) => file_name[stem_start + idx..].to_lowercase(),
        None => String::new(),
    }
}

/// Guess a MIME type from a normalized extension.
pub fn guess_mime_type(ext: &str) -> &'static str {
    match ext.trim_start_matches('.') {
        "txt" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "csv" => "text/csv",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "gzip" => "application/gzip",
        "tar" => "application/x-tar",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => "application/octet-stream",
    }
}

/// The declared content type if present, otherwise a guess from the extension.
pub fn effective_media_type(declared: Option<&str>, ext: &str) -> String {
    match declared.map(str::trim).filter(|m| !m.is_empty()) {
        Some(mime) => mime.to_lowercase(),
        None => guess_mime_type(ext).to_string(),
    }
}
