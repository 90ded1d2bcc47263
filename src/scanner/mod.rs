/// Media scanning module
///
/// This module handles:
/// - Detecting image formats from header bytes (signature.rs)
/// - Deciding whether a path is an image or a raw image, and probing its size (classify.rs)
/// - Computing where derived artifacts are cached (cache.rs)

pub mod cache;
pub mod classify;
pub mod signature;

pub use cache::CachePaths;
pub use classify::{image_size, Classifier, Dimensions};
pub use signature::{HeaderSniffer, ImageKind, SignatureDetector};
