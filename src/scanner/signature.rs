/// Image format detection from header bytes
use std::fmt;

/// Number of header bytes the detectors look at
pub const HEADER_LEN: usize = 12;

/// Every format the built-in sniffer recognises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Jpg,
    Png,
    Gif,
    Bmp,
    Webp,
    Tif,
    Cr2,
    Crw,
    Arw,
    Dng,
    Nef,
    Orf,
    Rw2,
    Raf,
}

/// Camera raw formats
pub const RAW_KINDS: &[ImageKind] = &[ImageKind::Cr2, ImageKind::Arw, ImageKind::Crw, ImageKind::Dng];

/// Everything the library accepts as an image
pub const IMAGE_KINDS: &[ImageKind] = &[
    ImageKind::Cr2,
    ImageKind::Arw,
    ImageKind::Crw,
    ImageKind::Dng,
    ImageKind::Jpg,
    ImageKind::Png,
    ImageKind::Gif,
    ImageKind::Bmp,
];

/// TIFF-based raw formats that can't be told apart from a plain TIFF in 12 bytes
const TIFF_BASED_RAW: &[ImageKind] = &[ImageKind::Dng, ImageKind::Arw, ImageKind::Nef];

const ALL_KINDS: &[ImageKind] = &[
    ImageKind::Jpg,
    ImageKind::Png,
    ImageKind::Gif,
    ImageKind::Bmp,
    ImageKind::Webp,
    ImageKind::Tif,
    ImageKind::Cr2,
    ImageKind::Crw,
    ImageKind::Arw,
    ImageKind::Dng,
    ImageKind::Nef,
    ImageKind::Orf,
    ImageKind::Rw2,
    ImageKind::Raf,
];

impl ImageKind {
    /// Canonical lowercase file extension
    pub fn ext(self) -> &'static str {
        match self {
            ImageKind::Jpg => "jpg",
            ImageKind::Png => "png",
            ImageKind::Gif => "gif",
            ImageKind::Bmp => "bmp",
            ImageKind::Webp => "webp",
            ImageKind::Tif => "tif",
            ImageKind::Cr2 => "cr2",
            ImageKind::Crw => "crw",
            ImageKind::Arw => "arw",
            ImageKind::Dng => "dng",
            ImageKind::Nef => "nef",
            ImageKind::Orf => "orf",
            ImageKind::Rw2 => "rw2",
            ImageKind::Raf => "raf",
        }
    }

    /// Parse an extension (case-insensitive, `jpeg` and `tiff` accepted)
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        match ext.as_str() {
            "jpeg" => Some(ImageKind::Jpg),
            "tiff" => Some(ImageKind::Tif),
            other => ALL_KINDS.iter().copied().find(|kind| kind.ext() == other),
        }
    }

    pub fn is_raw(self) -> bool {
        RAW_KINDS.contains(&self)
    }

    /// Refine a plain TIFF detection using the file extension.
    /// DNG, ARW and NEF keep their distinguishing tags past the 12-byte head.
    pub fn refine_tiff(self, extension: Option<&str>) -> Self {
        if self != ImageKind::Tif {
            return self;
        }

        extension
            .and_then(ImageKind::from_extension)
            .filter(|kind| TIFF_BASED_RAW.contains(kind))
            .unwrap_or(self)
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ext())
    }
}

/// Maps a header buffer to a format, or `None` when no signature matches
pub trait SignatureDetector: Send + Sync {
    fn detect(&self, header: &[u8]) -> Option<ImageKind>;
}

impl<F> SignatureDetector for F
where
    F: Fn(&[u8]) -> Option<ImageKind> + Send + Sync,
{
    fn detect(&self, header: &[u8]) -> Option<ImageKind> {
        self(header)
    }
}

/// Built-in magic number table
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderSniffer;

impl SignatureDetector for HeaderSniffer {
    fn detect(&self, header: &[u8]) -> Option<ImageKind> {
        let at = |offset: usize, magic: &[u8]| {
            header.get(offset..offset + magic.len()) == Some(magic)
        };

        if at(0, &[0xFF, 0xD8, 0xFF]) {
            return Some(ImageKind::Jpg);
        }
        if at(0, &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(ImageKind::Png);
        }
        if at(0, b"GIF87a") || at(0, b"GIF89a") {
            return Some(ImageKind::Gif);
        }
        if at(0, b"RIFF") && at(8, b"WEBP") {
            return Some(ImageKind::Webp);
        }
        if at(0, b"FUJIFILMCCD-") {
            return Some(ImageKind::Raf);
        }
        // Canon CRW: "II", header length 0x1A, then "HEAPCCDR"
        if at(0, &[0x49, 0x49, 0x1A, 0x00, 0x00, 0x00]) && at(6, b"HEAPCC") {
            return Some(ImageKind::Crw);
        }
        if at(0, b"IIRO") || at(0, b"IIRS") || at(0, b"MMOR") {
            return Some(ImageKind::Orf);
        }
        if at(0, &[0x49, 0x49, 0x55, 0x00]) {
            return Some(ImageKind::Rw2);
        }
        if at(0, &[0x49, 0x49, 0x2A, 0x00]) || at(0, &[0x4D, 0x4D, 0x00, 0x2A]) {
            // Canon CR2 marks the TIFF header with "CR" right after the IFD offset
            if at(8, b"CR") {
                return Some(ImageKind::Cr2);
            }
            return Some(ImageKind::Tif);
        }
        if at(0, b"BM") {
            return Some(ImageKind::Bmp);
        }

        None
    }
}
