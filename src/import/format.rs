use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ImportError;

/// File kinds the capture flow accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    Pdf,
    Jpeg,
    Png,
    Tiff,
    Unsupported,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Tiff => "tiff",
            Self::Unsupported => "unsupported",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::Jpeg | Self::Png | Self::Tiff)
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

/// Detect the file kind from magic bytes, never from the file extension.
pub fn detect_format(bytes: &[u8]) -> FileKind {
    match bytes {
        // PDF: starts with %PDF
        [0x25, 0x50, 0x44, 0x46, ..] => FileKind::Pdf,
        // JPEG: starts with FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => FileKind::Jpeg,
        // PNG: starts with 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => FileKind::Png,
        // TIFF: little-endian (49 49 2A 00) or big-endian (4D 4D 00 2A)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => FileKind::Tiff,
        _ => FileKind::Unsupported,
    }
}

/// Path convenience: sniff the header without reading the whole file.
pub fn detect_format_from_path(path: &Path) -> Result<FileKind, ImportError> {
    let mut file = std::fs::File::open(path)?;
    let mut header = [0u8; 8];
    let read = file.read(&mut header)?;
    if read == 0 {
        return Err(ImportError::EmptyFile);
    }
    Ok(detect_format(&header[..read]))
}

pub fn is_pdf_file(bytes: &[u8]) -> bool {
    detect_format(bytes) == FileKind::Pdf
}

pub fn is_image_file(bytes: &[u8]) -> bool {
    detect_format(bytes).is_image()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_pdf_magic() {
        assert_eq!(detect_format(b"%PDF-1.7 rest"), FileKind::Pdf);
        assert!(is_pdf_file(b"%PDF-1.4"));
    }

    #[test]
    fn detects_image_magics() {
        assert_eq!(detect_format(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0]), FileKind::Jpeg);
        assert_eq!(
            detect_format(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]),
            FileKind::Png
        );
        assert_eq!(detect_format(&[0x49, 0x49, 0x2A, 0x00, 1, 2]), FileKind::Tiff);
        assert_eq!(detect_format(&[0x4D, 0x4D, 0x00, 0x2A, 1, 2]), FileKind::Tiff);
        assert!(is_image_file(&[0xFF, 0xD8, 0xFF]));
    }

    #[test]
    fn rejects_unknown_and_empty() {
        assert_eq!(detect_format(b"GIF89a"), FileKind::Unsupported);
        assert_eq!(detect_format(&[]), FileKind::Unsupported);
        assert!(!FileKind::Unsupported.is_supported());
    }

    #[test]
    fn extension_lies_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("actually_text.pdf");
        std::fs::write(&path, b"hello, not a pdf").unwrap();
        assert_eq!(detect_format_from_path(&path).unwrap(), FileKind::Unsupported);
    }

    #[test]
    fn empty_file_is_an_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jpg");
        std::fs::write(&path, b"").unwrap();
        assert!(matches!(
            detect_format_from_path(&path),
            Err(ImportError::EmptyFile)
        ));
    }

    #[test]
    fn real_encoded_png_is_detected() {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([10u8, 20, 30]));
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        assert_eq!(detect_format(buf.get_ref()), FileKind::Png);
    }
}
