use crate::config::MinSize;
use image::ImageReader;
use std::io::Cursor;

/// Measures an encoded image without decoding its pixels
///
/// Returns None when the bytes are not a recognizable image (an HTML error
/// page served at an image URL, a truncated file, an unsupported format).
pub fn decode_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}

/// Applies the minimum size filter
///
/// Without a filter every image passes, even one of unknown size. With a
/// filter, an unknown size never passes.
pub fn accepts(min_size: Option<MinSize>, size: Option<(u32, u32)>) -> bool {
    match (min_size, size) {
        (None, _) => true,
        (Some(min), Some((width, height))) => min.admits(width, height),
        (Some(_), None) => false,
    }
}
