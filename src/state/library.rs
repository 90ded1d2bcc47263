use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use super::data::{Album, Media};
use crate::error::{ClassifyError, Result, ShelfError};
use crate::scanner::{Classifier, ImageKind, SignatureDetector};

const ALBUM_COLUMNS: &str = "id, title, parent_album_id, path";
const MEDIA_COLUMNS: &str = "id, title, path, album_id, kind, date_shot";

/// The Library manages the SQLite catalog database.
/// It stores albums and the media scanned into them.
pub struct Library {
    conn: Connection,
    db_path: PathBuf,
}

impl Library {
    /// Open (or create) the catalog at `db_path` and initialize the schema
    pub fn open(db_path: &Path) -> Result<Self> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        log::info!("Catalog opened at: {}", db_path.display());

        let mut library = Library {
            conn,
            db_path: db_path.to_path_buf(),
        };
        library.init_schema()?;

        Ok(library)
    }

    /// A throwaway catalog that lives only as long as the connection
    pub fn open_in_memory() -> Result<Self> {
        let mut library = Library {
            conn: Connection::open_in_memory()?,
            db_path: PathBuf::from(":memory:"),
        };
        library.init_schema()?;
        Ok(library)
    }

    /// Initialize the database schema.
    /// Creates all necessary tables and indexes if they don't exist.
    fn init_schema(&mut self) -> rusqlite::Result<()> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS albums (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                parent_album_id INTEGER REFERENCES albums(id) ON DELETE CASCADE,
                path            TEXT NOT NULL UNIQUE
            );

            -- path_hash keeps lookups cheap for long paths
            CREATE TABLE IF NOT EXISTS media (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                title           TEXT NOT NULL,
                path            TEXT NOT NULL,
                path_hash       TEXT NOT NULL UNIQUE,
                album_id        INTEGER NOT NULL REFERENCES albums(id) ON DELETE CASCADE,
                kind            TEXT NOT NULL,
                date_shot       INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_albums_parent ON albums(parent_album_id);
            CREATE INDEX IF NOT EXISTS idx_media_album_id ON media(album_id);",
        )?;

        log::debug!("Catalog schema initialized");
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    pub fn album_count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM albums", [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn create_album(&self, title: &str, parent_album_id: Option<i64>, path: &str) -> Result<Album> {
        self.conn.execute(
            "INSERT INTO albums (title, parent_album_id, path) VALUES (?1, ?2, ?3)",
            params![title, parent_album_id, path],
        )?;

        Ok(Album {
            id: self.conn.last_insert_rowid(),
            title: title.to_string(),
            parent_album_id,
            path: path.to_string(),
        })
    }

    pub fn get_album(&self, id: i64) -> Result<Option<Album>> {
        let album = self
            .conn
            .query_row(
                &format!("SELECT {ALBUM_COLUMNS} FROM albums WHERE id = ?1"),
                [id],
                album_from_row,
            )
            .optional()?;
        Ok(album)
    }

    /// List albums ordered by title.
    ///
    /// With `only_root`, a catalog with a single root album (and anything
    /// below it) lists the root's children instead of the lone root. Unless
    /// `show_empty` is set, albums without media are left out.
    pub fn my_albums(&self, only_root: bool, show_empty: bool) -> Result<Vec<Album>> {
        let mut sql = format!("SELECT {ALBUM_COLUMNS} FROM albums WHERE 1 = 1");
        let mut bindings: Vec<i64> = Vec::new();

        if only_root {
            match self.single_root_album_id()? {
                Some(root_id) if self.album_count()? > 1 => {
                    sql.push_str(" AND parent_album_id = ?1");
                    bindings.push(root_id);
                }
                _ => sql.push_str(" AND parent_album_id IS NULL"),
            }
        }

        if !show_empty {
            sql.push_str(" AND EXISTS (SELECT 1 FROM media WHERE media.album_id = albums.id)");
        }

        sql.push_str(" ORDER BY title, id");

        let mut stmt = self.conn.prepare(&sql)?;
        let albums = stmt
            .query_map(params_from_iter(bindings), album_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(albums)
    }

    /// The id of the only root album, if there is exactly one
    fn single_root_album_id(&self) -> Result<Option<i64>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM albums WHERE parent_album_id IS NULL LIMIT 2")?;
        let roots = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;

        Ok(match roots.as_slice() {
            [root] => Some(*root),
            _ => None,
        })
    }

    pub fn media_in_album(&self, album_id: i64) -> Result<Vec<Media>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media WHERE album_id = ?1 ORDER BY date_shot, id"
        ))?;
        let media = stmt
            .query_map([album_id], media_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(media)
    }

    fn existing_media(&self, path_hash: &str) -> Result<Option<Media>> {
        let media = self
            .conn
            .query_row(
                &format!("SELECT {MEDIA_COLUMNS} FROM media WHERE path_hash = ?1"),
                [path_hash],
                media_from_row,
            )
            .optional()?;
        Ok(media)
    }

    /// Record the file at `path` in `album_id`.
    ///
    /// Returns the catalog row and whether it was newly created. A path that
    /// is already catalogued is returned as-is without touching the file.
    pub async fn scan_media<D: SignatureDetector>(
        &self,
        classifier: &Classifier<D>,
        path: &Path,
        album_id: i64,
    ) -> Result<(Media, bool)> {
        let path_str = path.to_string_lossy().to_string();
        let path_hash = hash_path(&path_str);

        if let Some(media) = self.existing_media(&path_hash)? {
            log::debug!("Already catalogued: {}", path.display());
            return Ok((media, false));
        }

        log::info!("Scanning media: {}", path.display());

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| ClassifyError::new(path, e))?;
        if metadata.is_dir() {
            return Err(ShelfError::NotMedia(path.to_path_buf()));
        }

        let kind = match classifier.detect(path).await? {
            Some(kind) if classifier.accepts(kind) => kind,
            _ => return Err(ShelfError::NotMedia(path.to_path_buf())),
        };

        let date_shot: DateTime<Utc> = metadata.modified()?.into();
        let title = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        self.conn.execute(
            "INSERT INTO media (title, path, path_hash, album_id, kind, date_shot)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                &title,
                &path_str,
                &path_hash,
                album_id,
                kind.ext(),
                date_shot.timestamp(),
            ],
        )?;

        let media = Media {
            id: self.conn.last_insert_rowid(),
            title,
            path: path_str,
            album_id,
            kind,
            // Stored with second precision
            date_shot: DateTime::from_timestamp(date_shot.timestamp(), 0).unwrap_or_default(),
        };

        Ok((media, true))
    }
}

fn hash_path(path: &str) -> String {
    hex::encode(Sha256::digest(path.as_bytes()))
}

fn album_from_row(row: &Row<'_>) -> rusqlite::Result<Album> {
    Ok(Album {
        id: row.get(0)?,
        title: row.get(1)?,
        parent_album_id: row.get(2)?,
        path: row.get(3)?,
    })
}

fn media_from_row(row: &Row<'_>) -> rusqlite::Result<Media> {
    let kind_text: String = row.get(4)?;
    let kind = ImageKind::from_extension(&kind_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown media kind: {kind_text}").into(),
        )
    })?;
    let date_shot: i64 = row.get(5)?;

    Ok(Media {
        id: row.get(0)?,
        title: row.get(1)?,
        path: row.get(2)?,
        album_id: row.get(3)?,
        kind,
        date_shot: DateTime::from_timestamp(date_shot, 0).unwrap_or_default(),
    })
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::signature::fixtures::{CR2, PNG, TEXT};

    fn library_with_tree() -> (Library, Album, Album, Album) {
        let library = Library::open_in_memory().unwrap();
        let root = library.create_album("Photos", None, "/photos").unwrap();
        let summer = library.create_album("Summer", Some(root.id), "/photos/summer").unwrap();
        let autumn = library.create_album("Autumn", Some(root.id), "/photos/autumn").unwrap();
        (library, root, summer, autumn)
    }

    #[test]
    fn test_create_and_get_album() {
        let library = Library::open_in_memory().unwrap();
        let album = library.create_album("Trips", None, "/trips").unwrap();

        assert_eq!(library.get_album(album.id).unwrap(), Some(album));
        assert_eq!(library.get_album(999).unwrap(), None);
        assert_eq!(library.album_count().unwrap(), 1);
    }

    #[test]
    fn test_open_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("catalog.db");

        let library = Library::open(&db_path).unwrap();
        assert!(db_path.exists());
        assert_eq!(library.path(), &db_path);
    }

    #[test]
    fn test_my_albums_single_root_lists_children() {
        let (library, _root, summer, autumn) = library_with_tree();

        let albums = library.my_albums(true, true).unwrap();
        assert_eq!(albums, vec![autumn, summer]);
    }

    #[test]
    fn test_my_albums_multiple_roots() {
        let (library, root, _summer, _autumn) = library_with_tree();
        let other = library.create_album("Archive", None, "/archive").unwrap();

        let albums = library.my_albums(true, true).unwrap();
        assert_eq!(albums, vec![other, root]);
    }

    #[test]
    fn test_my_albums_lone_root() {
        let library = Library::open_in_memory().unwrap();
        let root = library.create_album("Photos", None, "/photos").unwrap();

        assert_eq!(library.my_albums(true, true).unwrap(), vec![root]);
    }

    #[tokio::test]
    async fn test_my_albums_hides_empty() {
        let (library, _root, summer, _autumn) = library_with_tree();
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("beach.png");
        std::fs::write(&photo, PNG).unwrap();

        library
            .scan_media(&Classifier::default(), &photo, summer.id)
            .await
            .unwrap();

        assert_eq!(library.my_albums(false, false).unwrap(), vec![summer.clone()]);
        assert_eq!(library.my_albums(true, false).unwrap(), vec![summer]);
        assert_eq!(library.my_albums(false, true).unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_scan_media_creates_once() {
        let (library, _root, summer, _autumn) = library_with_tree();
        let dir = tempfile::tempdir().unwrap();
        let photo = dir.path().join("IMG_0001.CR2");
        std::fs::write(&photo, CR2).unwrap();
        let classifier = Classifier::default();

        let (media, created) = library.scan_media(&classifier, &photo, summer.id).await.unwrap();
        assert!(created);
        assert_eq!(media.title, "IMG_0001.CR2");
        assert_eq!(media.kind, ImageKind::Cr2);
        assert!(media.is_raw());

        let modified: DateTime<Utc> = std::fs::metadata(&photo).unwrap().modified().unwrap().into();
        assert_eq!(media.date_shot.timestamp(), modified.timestamp());

        let (again, created) = library.scan_media(&classifier, &photo, summer.id).await.unwrap();
        assert!(!created);
        assert_eq!(again, media);

        assert_eq!(library.media_in_album(summer.id).unwrap(), vec![media]);
    }

    #[tokio::test]
    async fn test_scan_media_rejects_non_images() {
        let (library, root, _summer, _autumn) = library_with_tree();
        let dir = tempfile::tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, TEXT).unwrap();
        let classifier = Classifier::default();

        let result = library.scan_media(&classifier, &notes, root.id).await;
        assert!(matches!(result, Err(ShelfError::NotMedia(p)) if p == notes));

        let result = library.scan_media(&classifier, dir.path(), root.id).await;
        assert!(matches!(result, Err(ShelfError::NotMedia(_))));

        assert!(library.media_in_album(root.id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_media_missing_file() {
        let (library, root, _summer, _autumn) = library_with_tree();
        let missing = PathBuf::from("/definitely/not/here.jpg");

        let result = library.scan_media(&Classifier::default(), &missing, root.id).await;
        assert!(matches!(result, Err(ShelfError::Classify(e)) if e.path == missing));
    }

    #[test]
    fn test_hash_path_is_stable() {
        assert_eq!(hash_path("/a/b.jpg"), hash_path("/a/b.jpg"));
        assert_ne!(hash_path("/a/b.jpg"), hash_path("/a/c.jpg"));
        assert_eq!(hash_path("").len(), 64);
    }
}
