//! Magic-byte content sniffing and media-type reconciliation.

/// Signature families that a declared extension can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Pdf,
    Png,
    Jpeg,
    Gif,
    Webp,
    /// Zip containers, including OOXML documents.
    Zip,
}

const OOXML_TYPES: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
];

fn family_of_extension(ext: &str) -> Option<Family> {
    match ext {
        ".pdf" => Some(Family::Pdf),
        ".png" => Some(Family::Png),
        ".jpg" | ".jpeg" => Some(Family::Jpeg),
        ".gif" => Some(Family::Gif),
        ".webp" => Some(Family::Webp),
        ".zip" | ".docx" | ".xlsx" | ".pptx" => Some(Family::Zip),
        _ => None,
    }
}

fn family_of_mime(mime: &str) -> Option<Family> {
    match mime {
        "application/pdf" => Some(Family::Pdf),
        "image/png" => Some(Family::Png),
        "image/jpeg" => Some(Family::Jpeg),
        "image/gif" => Some(Family::Gif),
        "image/webp" => Some(Family::Webp),
        "application/zip" => Some(Family::Zip),
        m if OOXML_TYPES.contains(&m) => Some(Family::Zip),
        _ => None,
    }
}

/// Identify binary content from its leading bytes.
///
/// Text-like signatures (markup, scripts) are ignored: they are too easily
/// produced by ordinary text files to override a declared type.
pub fn sniff(head: &[u8]) -> Option<&'static str> {
    infer::get(head)
        .filter(|t| t.matcher_type() != infer::MatcherType::Text)
        .map(|t| t.mime_type())
}

/// Decide the stored media type from what was declared and what was sniffed.
///
/// Returns `Err(reason)` when the content contradicts an extension that
/// carries its own signature, i.e. a likely spoofed extension.
pub fn reconcile(ext: &str, declared: &str, sniffed: Option<&str>) -> Result<String, String> {
    let Some(sniffed) = sniffed else {
        return Ok(declared.to_string());
    };
    let sniffed_family = family_of_mime(sniffed);

    if let Some(expected) = family_of_extension(ext)
        && sniffed_family != Some(expected)
    {
        return Err("file content does not match extension".to_string());
    }

    // A generic zip sniff must not erase a more specific container type.
    if sniffed_family == Some(Family::Zip) && family_of_mime(declared) == Some(Family::Zip) {
        return Ok(declared.to_string());
    }

    Ok(sniffed.to_string())
}
