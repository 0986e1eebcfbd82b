//! Card image loading for composition
//!
//! Source images (JPEG or PNG from the download subsystem) are decoded,
//! optionally trimmed at the borders, and embedded as RGB Image XObjects.

use crate::types::{PrintError, Result};
use lopdf::{Dictionary, Object, Stream};
use std::io::ErrorKind;
use std::path::Path;

/// A decoded card image ready to be added to the document
pub(crate) struct LoadedImage {
    pub stream: Stream,
    /// Pixel size after cropping
    pub width: u32,
    pub height: u32,
    /// Pixel size of the file as decoded
    pub source_size: (u32, u32),
}

/// Read and decode a card image into an Image XObject stream.
///
/// `crop_fraction` of the width is removed from both the left and right
/// edges, and likewise for the height.
///
/// Returns `Ok(None)` when the file no longer exists; the caller leaves the
/// slot blank. Any other read or decode failure is an error.
pub(crate) fn load_card_image(path: &Path, crop_fraction: f32) -> Result<Option<LoadedImage>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let mut decoded =
        image::load_from_memory(&bytes).map_err(|source| PrintError::ImageDecode {
            path: path.to_path_buf(),
            source,
        })?;

    let source_size = (decoded.width(), decoded.height());
    if crop_fraction > 0.0 {
        let (w, h) = source_size;
        let dx = (w as f32 * crop_fraction) as u32;
        let dy = (h as f32 * crop_fraction) as u32;
        let cw = w.saturating_sub(2 * dx).max(1);
        let ch = h.saturating_sub(2 * dy).max(1);
        decoded = decoded.crop_imm(dx, dy, cw, ch);
    }

    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();

    let dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"XObject".to_vec())),
        ("Subtype", Object::Name(b"Image".to_vec())),
        ("Width", Object::Integer(width as i64)),
        ("Height", Object::Integer(height as i64)),
        ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
        ("BitsPerComponent", Object::Integer(8)),
    ]);

    Ok(Some(LoadedImage {
        stream: Stream::new(dict, rgb.into_raw()),
        width,
        height,
        source_size,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_trims_every_edge() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        image::RgbImage::new(100, 200).save(&path).unwrap();

        let full = load_card_image(&path, 0.0).unwrap().unwrap();
        assert_eq!((full.width, full.height), (100, 200));

        let cropped = load_card_image(&path, 0.1).unwrap().unwrap();
        assert_eq!((cropped.width, cropped.height), (80, 160));
        assert_eq!(cropped.source_size, (100, 200));
    }
}
