/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the database layer and the UI layer.
use chrono::{DateTime, Utc};

use crate::scanner::ImageKind;

/// A folder of media in the catalog; albums nest through `parent_album_id`
#[derive(Debug, Clone, PartialEq)]
pub struct Album {
    pub id: i64,
    pub title: String,
    /// None for root albums
    pub parent_album_id: Option<i64>,
    /// Directory the album was created from
    pub path: String,
}

/// A single classified image in the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    pub id: i64,
    /// Filename only (e.g., "IMG_0001.CR2")
    pub title: String,
    /// Full path to the source file
    pub path: String,
    pub album_id: i64,
    /// Format detected when the file was scanned
    pub kind: ImageKind,
    /// File modification time at scan
    pub date_shot: DateTime<Utc>,
}

impl Media {
    pub fn is_raw(&self) -> bool {
        self.kind.is_raw()
    }
}
