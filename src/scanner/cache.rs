/// Cache layout for derived artifacts (thumbnails, previews)
///
/// Everything lives under `<cache root>/images/<album id>/<image id>`. The
/// helpers only compute paths; nothing is created or checked on disk.
use std::fmt::Display;
use std::path::{Path, PathBuf};

const IMAGES_DIR: &str = "images";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePaths {
    root: PathBuf,
}

impl CachePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding every cached file of an album
    pub fn album_cache_path(&self, album_id: impl Display) -> PathBuf {
        self.root.join(IMAGES_DIR).join(album_id.to_string())
    }

    /// Location of one image's cached artifact inside its album directory
    pub fn image_cache_path(&self, image_id: impl Display, album_id: impl Display) -> PathBuf {
        self.album_cache_path(album_id).join(image_id.to_string())
    }
}
