//! Image sniffing by magic number.
//!
//! Uploads are accepted only when the leading bytes match one of four
//! signatures. The declared MIME type of a multipart part is checked
//! separately by the HTTP layer; this module never trusts it.

use crate::error::ImageError;

/// Default upload ceiling (10 MiB)
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// MIME types the upload endpoint accepts
pub const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Supported image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG (`FF D8 FF`)
    Jpeg,
    /// PNG (`89 50 4E 47`)
    Png,
    /// GIF (`47 49 46`)
    Gif,
    /// WebP (RIFF container, `52 49 46 46`)
    WebP,
}

impl ImageFormat {
    const ALL: [Self; 4] = [Self::Jpeg, Self::Png, Self::Gif, Self::WebP];

    /// Leading bytes identifying the format
    #[must_use]
    pub const fn signature(self) -> &'static [u8] {
        match self {
            Self::Jpeg => &[0xFF, 0xD8, 0xFF],
            Self::Png => &[0x89, 0x50, 0x4E, 0x47],
            Self::Gif => &[0x47, 0x49, 0x46],
            Self::WebP => &[0x52, 0x49, 0x46, 0x46],
        }
    }

    /// Canonical MIME type
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
        }
    }

    /// Detect the format from the leading bytes.
    #[must_use]
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|format| bytes.starts_with(format.signature()))
    }
}

/// Whether a declared MIME type is one the upload endpoint accepts.
#[must_use]
pub fn is_allowed_mime_type(mime: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&mime)
}

/// Validate an image buffer against a size ceiling and the known signatures.
///
/// # Errors
///
/// - [`ImageError::TooLarge`] if `bytes.len() > max_bytes`
/// - [`ImageError::UnsupportedFormat`] if no signature matches
pub fn validate_image(bytes: &[u8], max_bytes: usize) -> Result<ImageFormat, ImageError> {
    if bytes.len() > max_bytes {
        return Err(ImageError::TooLarge {
            size: bytes.len(),
            max: max_bytes,
        });
    }

    let format = ImageFormat::sniff(bytes).ok_or(ImageError::UnsupportedFormat)?;
    tracing::debug!(format = format.mime_type(), "Valid image detected");
    Ok(format)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_jpeg_accepted() {
        let bytes = [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];
        assert_eq!(validate_image(&bytes, 1024), Ok(ImageFormat::Jpeg));
    }

    #[test]
    fn test_png_gif_webp_accepted() {
        let png = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let gif = b"GIF89a";
        let webp = b"RIFF\x00\x00\x00\x00WEBP";

        assert_eq!(validate_image(&png, 1024), Ok(ImageFormat::Png));
        assert_eq!(validate_image(gif, 1024), Ok(ImageFormat::Gif));
        assert_eq!(validate_image(webp, 1024), Ok(ImageFormat::WebP));
    }

    #[test]
    fn test_unknown_signature_rejected() {
        assert_eq!(
            validate_image(b"%PDF-1.7", 1024),
            Err(ImageError::UnsupportedFormat)
        );
        assert_eq!(validate_image(&[], 1024), Err(ImageError::UnsupportedFormat));
    }

    #[test]
    fn test_truncated_signature_rejected() {
        assert_eq!(
            validate_image(&[0xFF, 0xD8], 1024),
            Err(ImageError::UnsupportedFormat)
        );
    }

    #[test]
    fn test_too_large_rejected_before_sniffing() {
        let mut bytes = vec![0u8; 11];
        bytes[..3].copy_from_slice(&[0xFF, 0xD8, 0xFF]);

        assert_eq!(
            validate_image(&bytes, 10),
            Err(ImageError::TooLarge { size: 11, max: 10 })
        );
    }

    #[test]
    fn test_size_ceiling_is_inclusive() {
        let bytes = [0x47, 0x49, 0x46, 0x38];
        assert_eq!(validate_image(&bytes, 4), Ok(ImageFormat::Gif));
    }

    #[test]
    fn test_allowed_mime_types() {
        assert!(is_allowed_mime_type("image/png"));
        assert!(is_allowed_mime_type("image/webp"));
        assert!(!is_allowed_mime_type("image/svg+xml"));
        assert!(!is_allowed_mime_type("application/pdf"));
    }

    proptest! {
        #[test]
        fn prop_jpeg_prefix_always_accepted(tail in proptest::collection::vec(any::<u8>(), 0..256)) {
            let mut bytes = vec![0xFF, 0xD8, 0xFF];
            bytes.extend(tail);
            prop_assert_eq!(validate_image(&bytes, DEFAULT_MAX_IMAGE_BYTES), Ok(ImageFormat::Jpeg));
        }

        #[test]
        fn prop_unrelated_first_byte_always_rejected(
            first in any::<u8>().prop_filter("not a signature start", |b| ![0xFF, 0x89, 0x47, 0x52].contains(b)),
            tail in proptest::collection::vec(any::<u8>(), 0..256),
        ) {
            let mut bytes = vec![first];
            bytes.extend(tail);
            prop_assert_eq!(
                validate_image(&bytes, DEFAULT_MAX_IMAGE_BYTES),
                Err(ImageError::UnsupportedFormat)
            );
        }
    }
}
