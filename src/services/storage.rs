//! Face image storage on the local filesystem.
//!
//! Approved images live in a per-user numbered store
//! (`faces/<user>/<user>_<n>.jpg`); captures awaiting a verdict live under
//! `pending_faces/`. Paths handed around the app are always relative to the
//! media root; URLs are formed by prefixing the public media URL.

use std::fs;
use std::path::{Path, PathBuf};

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid image payload: {0}")]
    InvalidImage(String),
    #[error("image not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Clone)]
pub struct MediaStore {
    root: PathBuf,
    base_url: String,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    /// Decode a browser capture. Accepts a bare base64 string or a
    /// `data:image/...;base64,` URL.
    pub fn decode_capture(image_data: &str) -> Result<Vec<u8>, StorageError> {
        let encoded = match image_data.split_once(',') {
            Some((header, rest)) if header.starts_with("data:") => rest,
            _ => image_data,
        };

        let bytes = BASE64
            .decode(encoded.trim())
            .map_err(|e| StorageError::InvalidImage(e.to_string()))?;

        if bytes.is_empty() {
            return Err(StorageError::InvalidImage("empty image".to_string()));
        }

        Ok(bytes)
    }

    pub fn absolute(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    pub fn url_for(&self, rel: &str) -> String {
        format!("{}{}", self.base_url, rel.replace('\\', "/"))
    }

    /// Write a capture awaiting verification. One pending slot per user;
    /// a newer capture overwrites the previous one.
    pub fn save_pending(&self, username: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let rel = format!("pending_faces/{}_pending.jpg", username);
        self.write(&rel, bytes)?;
        Ok(rel)
    }

    /// Write into the next free slot of the user's numbered store.
    pub fn store_numbered(&self, username: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let rel = self.next_numbered(username)?;
        self.write(&rel, bytes)?;
        Ok(rel)
    }

    /// Copy an already-stored image (e.g. an approved pending capture) into
    /// the next numbered slot.
    pub fn adopt_numbered(&self, username: &str, src_rel: &str) -> Result<String, StorageError> {
        let src = self.absolute(src_rel);
        if !src.exists() {
            return Err(StorageError::NotFound(src_rel.to_string()));
        }
        let rel = self.next_numbered(username)?;
        let dest = self.absolute(&rel);
        ensure_parent(&dest)?;
        fs::copy(&src, &dest)?;
        Ok(rel)
    }

    /// Copy a master-list face into the user's default slot, overwriting any
    /// previous default.
    pub fn copy_as_default(&self, username: &str, src_rel: &str) -> Result<String, StorageError> {
        let src = self.absolute(src_rel);
        if !src.exists() {
            return Err(StorageError::NotFound(src_rel.to_string()));
        }
        let rel = format!("faces/{}/{}_default.jpg", username, username);
        let dest = self.absolute(&rel);
        ensure_parent(&dest)?;
        fs::copy(&src, &dest)?;
        Ok(rel)
    }

    /// Remove a stored image. Missing files are fine; rejection cleanup may
    /// run more than once.
    pub fn remove(&self, rel: &str) {
        let path = self.absolute(rel);
        if let Err(e) = fs::remove_file(&path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(error = %e, path = %path.display(), "Failed to remove image");
            }
        }
    }

    fn next_numbered(&self, username: &str) -> Result<String, StorageError> {
        let dir = self.root.join("faces").join(username);
        fs::create_dir_all(&dir)?;

        let existing = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                let name = entry.file_name();
                let name = name.to_string_lossy();
                name.starts_with(username) && name.ends_with(".jpg")
            })
            .count();

        Ok(format!(
            "faces/{}/{}_{}.jpg",
            username,
            username,
            existing + 1
        ))
    }

    fn write(&self, rel: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.absolute(rel);
        ensure_parent(&path)?;
        fs::write(path, bytes)?;
        Ok(())
    }
}

fn ensure_parent(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, MediaStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path(), "/media/");
        (dir, store)
    }

    #[test]
    fn decodes_data_url_and_bare_base64() {
        let bytes = b"jpegdata";
        let encoded = BASE64.encode(bytes);

        let from_url =
            MediaStore::decode_capture(&format!("data:image/jpeg;base64,{}", encoded)).unwrap();
        let from_bare = MediaStore::decode_capture(&encoded).unwrap();

        assert_eq!(from_url, bytes);
        assert_eq!(from_bare, bytes);
    }

    #[test]
    fn rejects_bad_and_empty_payloads() {
        assert!(MediaStore::decode_capture("!!not-base64!!").is_err());
        assert!(MediaStore::decode_capture("").is_err());
    }

    #[test]
    fn numbered_store_counts_up() {
        let (_dir, store) = store();

        let first = store.store_numbered("jdoe", b"one").unwrap();
        let second = store.store_numbered("jdoe", b"two").unwrap();

        assert_eq!(first, "faces/jdoe/jdoe_1.jpg");
        assert_eq!(second, "faces/jdoe/jdoe_2.jpg");
        assert_eq!(fs::read(store.absolute(&second)).unwrap(), b"two");
    }

    #[test]
    fn adopt_copies_pending_into_numbered_slot() {
        let (_dir, store) = store();

        let pending = store.save_pending("jdoe", b"capture").unwrap();
        let adopted = store.adopt_numbered("jdoe", &pending).unwrap();

        assert_eq!(adopted, "faces/jdoe/jdoe_1.jpg");
        assert_eq!(fs::read(store.absolute(&adopted)).unwrap(), b"capture");
        // source is untouched; callers decide when to clean it up
        assert!(store.absolute(&pending).exists());
    }

    #[test]
    fn adopt_missing_source_fails() {
        let (_dir, store) = store();
        assert!(matches!(
            store.adopt_numbered("jdoe", "pending_faces/nope.jpg"),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn remove_is_idempotent() {
        let (_dir, store) = store();
        let rel = store.save_pending("jdoe", b"capture").unwrap();
        store.remove(&rel);
        store.remove(&rel); // second call must not panic
        assert!(!store.absolute(&rel).exists());
    }

    #[test]
    fn urls_join_media_prefix() {
        let (_dir, store) = store();
        assert_eq!(
            store.url_for("faces/jdoe/jdoe_1.jpg"),
            "/media/faces/jdoe/jdoe_1.jpg"
        );
    }
}
