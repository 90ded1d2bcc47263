use std::path::Path;
use image::ImageReader;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

use super::signature::{HeaderSniffer, ImageKind, SignatureDetector, HEADER_LEN, IMAGE_KINDS, RAW_KINDS};
use crate::error::ClassifyError;

/// Pixel dimensions of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Decides whether files are images by sniffing their first bytes.
///
/// The detector is pluggable and both allow-lists can be extended, so new
/// formats never require changes at the call sites.
#[derive(Debug, Clone)]
pub struct Classifier<D = HeaderSniffer> {
    detector: D,
    image_kinds: Vec<ImageKind>,
    raw_kinds: Vec<ImageKind>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(HeaderSniffer)
    }
}

impl<D: SignatureDetector> Classifier<D> {
    pub fn new(detector: D) -> Self {
        Self {
            detector,
            image_kinds: IMAGE_KINDS.to_vec(),
            raw_kinds: RAW_KINDS.to_vec(),
        }
    }

    /// Accept an extra format as an image
    pub fn allow_image(mut self, kind: ImageKind) -> Self {
        if !self.image_kinds.contains(&kind) {
            self.image_kinds.push(kind);
        }
        self
    }

    /// Accept an extra format as a raw image (and therefore as an image)
    pub fn allow_raw(mut self, kind: ImageKind) -> Self {
        if !self.raw_kinds.contains(&kind) {
            self.raw_kinds.push(kind);
        }
        self.allow_image(kind)
    }

    pub fn accepts(&self, kind: ImageKind) -> bool {
        self.image_kinds.contains(&kind)
    }

    /// Is `path` a file with a recognised image signature?
    /// Directories are rejected from their metadata alone.
    pub async fn is_image(&self, path: &Path) -> Result<bool, ClassifyError> {
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ClassifyError::new(path, e))?;
        if metadata.is_dir() {
            return Ok(false);
        }

        let kind = self.detect(path).await?;
        Ok(kind.is_some_and(|kind| self.image_kinds.contains(&kind)))
    }

    /// Is `path` a camera raw file? Files with no recognised signature are not.
    pub async fn is_raw_image(&self, path: &Path) -> Result<bool, ClassifyError> {
        let kind = self.detect(path).await?;
        Ok(kind.is_some_and(|kind| self.raw_kinds.contains(&kind)))
    }

    /// Detect the format of `path` from its header.
    /// Plain TIFF detections are refined by extension (see [`ImageKind::refine_tiff`]).
    pub async fn detect(&self, path: &Path) -> Result<Option<ImageKind>, ClassifyError> {
        let header = read_header(path)
            .await
            .map_err(|e| ClassifyError::new(path, e))?;

        let extension = path.extension().and_then(|ext| ext.to_str());
        Ok(self
            .detector
            .detect(&header)
            .map(|kind| kind.refine_tiff(extension)))
    }
}

/// Read up to [`HEADER_LEN`] bytes; shorter files yield what they have
async fn read_header(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = File::open(path).await?;
    let mut header = Vec::with_capacity(HEADER_LEN);
    file.take(HEADER_LEN as u64).read_to_end(&mut header).await?;
    Ok(header)
}

/// Probe image dimensions.
///
/// Standard formats go through the `image` crate, which reads only the
/// header. Raw files fall back to rawloader, which decodes the full sensor
/// buffer to learn the size.
pub async fn image_size(path: &Path) -> Result<Dimensions, ClassifyError> {
    let owned = path.to_path_buf();

    // Spawn blocking because both probes do synchronous file I/O
    tokio::task::spawn_blocking(move || image_size_blocking(&owned))
        .await
        .map_err(|e| ClassifyError::new(path, e))?
}

/// Header dimensions with the format guessed from content, not the extension
fn probe_dimensions(path: &Path) -> image::ImageResult<(u32, u32)> {
    ImageReader::open(path)?.with_guessed_format()?.into_dimensions()
}

fn image_size_blocking(path: &Path) -> Result<Dimensions, ClassifyError> {
    match probe_dimensions(path) {
        Ok((width, height)) => Ok(Dimensions { width, height }),
        Err(image_err) => {
            let raw = rawloader::decode_file(path).map_err(|raw_err| {
                log::debug!("rawloader could not read {}: {:?}", path.display(), raw_err);
                ClassifyError::new(path, image_err)
            })?;

            Ok(Dimensions {
                width: raw.width as u32,
                height: raw.height as u32,
            })
        }
    }
}
