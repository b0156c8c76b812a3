use base64::{engine::general_purpose, Engine as _};
use std::path::Path;

/// Key of an auxiliary image in the image namespace.
pub fn image_key(book_id: &str, path: &str) -> String {
    format!("{}|{}", book_id, path)
}

/// Prefix shared by every image key of a book.
pub fn image_key_prefix(book_id: &str) -> String {
    format!("{}|", book_id)
}

/// Guess a mime type from the resource extension. Unknown extensions are
/// treated as JPEG, the most common cover format.
pub fn mime_for_path(path: &str) -> &'static str {
    let ext = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "image/jpeg",
    }
}

/// Inline an image as a `data:` URL.
pub fn to_data_url(path: &str, data: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_for_path(path),
        general_purpose::STANDARD.encode(data)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_guess() {
        assert_eq!(mime_for_path("OEBPS/Images/cover.PNG"), "image/png");
        assert_eq!(mime_for_path("cover.jpeg"), "image/jpeg");
        assert_eq!(mime_for_path("cover"), "image/jpeg");
    }

    #[test]
    fn test_data_url() {
        assert_eq!(to_data_url("a.gif", b"GIF"), "data:image/gif;base64,R0lG");
    }

    #[test]
    fn test_image_keys() {
        let key = image_key("book-1", "Images/fig.png");
        assert_eq!(key, "book-1|Images/fig.png");
        assert!(key.starts_with(&image_key_prefix("book-1")));
    }
}
