//! File classification into export buckets.
//!
//! The mapping is a fixed table so every extension lands in exactly one bucket.

use crate::domain::Bucket;

/// Bucket for a file extension (with or without a leading dot, any case).
pub fn bucket_for_extension(extension: &str) -> Bucket {
    let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();

    match ext.as_str() {
        "pdf" => Bucket::Pdf,
        "doc" | "docx" | "docm" | "dot" | "dotx" | "odt" | "rtf" => Bucket::Word,
        "xls" | "xlsx" | "xlsm" | "ods" | "csv" | "tsv" => Bucket::Spreadsheet,
        "ppt" | "pptx" | "pptm" | "odp" | "key" => Bucket::Presentation,
        "png" | "jpg" | "jpeg" | "gif" | "bmp" | "tif" | "tiff" | "webp" | "svg" | "heic" => {
            Bucket::Image
        }
        "epub" | "mobi" | "azw" | "azw3" | "djvu" => Bucket::Ebook,
        _ => Bucket::Other,
    }
}

/// Bucket for a declared MIME type, used when the file name has no extension.
pub fn bucket_for_content_type(content_type: &str) -> Bucket {
    let mime = content_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();

    match mime.as_str() {
        "application/pdf" => Bucket::Pdf,
        "application/msword"
        | "application/rtf"
        | "application/vnd.oasis.opendocument.text"
        | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => Bucket::Word,
        "application/vnd.ms-excel"
        | "application/vnd.oasis.opendocument.spreadsheet"
        | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        | "text/csv" => Bucket::Spreadsheet,
        "application/vnd.ms-powerpoint"
        | "application/vnd.oasis.opendocument.presentation"
        | "application/vnd.openxmlformats-officedocument.presentationml.presentation" => {
            Bucket::Presentation
        }
        "application/epub+zip" | "image/vnd.djvu" => Bucket::Ebook,
        m if m.starts_with("image/") => Bucket::Image,
        _ => Bucket::Other,
    }
}

/// Classify an attachment: the extension decides, the MIME type is the fallback.
pub fn classify_attachment(extension: Option<&str>, content_type: Option<&str>) -> Bucket {
    match (extension, content_type) {
        (Some(ext), _) => bucket_for_extension(ext),
        (None, Some(mime)) => bucket_for_content_type(mime),
        (None, None) => Bucket::Other,
    }
}
