//! Cover lookup. Never fails: any problem means "no cover".

use crate::image;
use crate::reader::BookReader;

/// Resolve the cover as a data URL, trying the declared cover first and the
/// manifest fallback second.
pub fn resolve_cover(reader: &dyn BookReader) -> Option<String> {
    let candidates = [reader.cover_locator(), reader.manifest_cover()];

    for path in candidates.into_iter().flatten() {
        match reader.read_resource(&path) {
            Ok(data) if !data.is_empty() => return Some(image::to_data_url(&path, &data)),
            Ok(_) => tracing::debug!(path = %path, "Cover resource is empty"),
            Err(e) => tracing::warn!(path = %path, error = %e, "Failed to read cover"),
        }
    }

    None
}
