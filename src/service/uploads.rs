use crate::error::PortfolioError;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tracing::{debug, info};

/// A file written to the upload directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub file_name: String,
    /// Value persisted in the `image_path` column, e.g. `uploads/1718000000000.png`.
    pub relative_path: String,
    pub absolute_path: PathBuf,
}

/// Upload directory plus the prefix under which its files are stored and served.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
    prefix: String,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl AsRef<str>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.as_ref().trim_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Route under which the static file server is mounted, e.g. `/uploads`.
    pub fn url_prefix(&self) -> String {
        format!("/{}", self.prefix)
    }

    /// Create the upload directory if it does not exist yet.
    /// Fails when the path exists but is not a directory.
    pub async fn ensure_dir(&self) -> Result<(), PortfolioError> {
        match fs::metadata(&self.dir).await {
            Ok(meta) if meta.is_dir() => return Ok(()),
            Ok(_) => {
                return Err(std::io::Error::new(
                    ErrorKind::NotADirectory,
                    format!("upload path {} is not a directory", self.dir.display()),
                )
                .into());
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::create_dir_all(&self.dir).await?;
        info!(path = %self.dir.display(), "created upload directory");
        Ok(())
    }

    /// Open a fresh file named `<millis><ext>` for an upload called `original_name`.
    ///
    /// The name is claimed with create-new semantics; if another upload already
    /// took this millisecond the timestamp is bumped until a free name is found.
    pub async fn create(&self, original_name: &str) -> Result<(File, StoredImage), PortfolioError> {
        let ext = extension_of(original_name);
        let mut millis = Utc::now().timestamp_millis();
        loop {
            let file_name = stored_file_name(millis, &ext);
            let absolute_path = self.dir.join(&file_name);
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&absolute_path)
                .await
            {
                Ok(file) => {
                    let image = StoredImage {
                        relative_path: format!("{}/{}", self.prefix, file_name),
                        file_name,
                        absolute_path,
                    };
                    return Ok((file, image));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(file = %file_name, "upload name taken; bumping timestamp");
                    millis += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Map a stored `image_path` back to a filesystem path.
    ///
    /// Paths under the upload prefix resolve into the upload directory; anything
    /// else is taken as a path relative to the working directory.
    pub fn resolve(&self, stored: &str) -> PathBuf {
        let rest = stored
            .strip_prefix(self.prefix.as_str())
            .and_then(|r| r.strip_prefix('/'));
        match rest {
            Some(file_name) => self.dir.join(file_name),
            None => PathBuf::from(stored),
        }
    }

    pub async fn remove(&self, stored: &str) -> Result<(), PortfolioError> {
        let path = self.resolve(stored);
        fs::remove_file(&path).await?;
        info!(path = %path.display(), "removed uploaded file");
        Ok(())
    }
}

/// Extension of the client-supplied file name including the dot, or `""`.
fn extension_of(original_name: &str) -> String {
    Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default()
}

fn stored_file_name(millis: i64, ext: &str) -> String {
    format!("{millis}{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::io::AsyncWriteExt;

    #[test]
    fn extension_keeps_the_dot() {
        assert_eq!(extension_of("photo.png"), ".png");
        assert_eq!(extension_of("archive.tar.gz"), ".gz");
        assert_eq!(extension_of("README"), "");
        assert_eq!(extension_of(".bashrc"), "");
        assert_eq!(extension_of("trailing."), ".");
    }

    #[test]
    fn stored_name_is_timestamp_plus_extension() {
        assert_eq!(stored_file_name(1718000000000, ".jpg"), "1718000000000.jpg");
        assert_eq!(stored_file_name(5, ""), "5");
    }

    #[test]
    fn resolve_maps_prefix_into_dir() {
        let store = UploadStore::new("/srv/uploads", "/uploads/");
        assert_eq!(store.prefix(), "uploads");
        assert_eq!(store.url_prefix(), "/uploads");
        assert_eq!(
            store.resolve("uploads/1.png"),
            PathBuf::from("/srv/uploads/1.png")
        );
        assert_eq!(
            store.resolve("/var/tmp/other.png"),
            PathBuf::from("/var/tmp/other.png")
        );
        assert_eq!(
            store.resolve("uploadsX/1.png"),
            PathBuf::from("uploadsX/1.png")
        );
    }

    #[tokio::test]
    async fn ensure_dir_creates_missing_directory() {
        let tmp = tempdir().unwrap();
        let dir = tmp.path().join("nested").join("uploads");
        let store = UploadStore::new(&dir, "uploads");
        store.ensure_dir().await.unwrap();
        assert!(dir.is_dir());
        store.ensure_dir().await.unwrap();
    }

    #[tokio::test]
    async fn ensure_dir_rejects_a_regular_file() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("uploads");
        std::fs::write(&path, b"not a dir").unwrap();

        let store = UploadStore::new(&path, "uploads");
        assert!(matches!(
            store.ensure_dir().await,
            Err(PortfolioError::IoError(_))
        ));
    }

    #[tokio::test]
    async fn create_never_reuses_a_name() {
        let tmp = tempdir().unwrap();
        let store = UploadStore::new(tmp.path(), "uploads");

        let (mut a, first) = store.create("a.png").await.unwrap();
        a.write_all(b"first").await.unwrap();
        a.flush().await.unwrap();
        let (_b, second) = store.create("b.png").await.unwrap();

        assert_ne!(first.file_name, second.file_name);
        assert!(first.file_name.ends_with(".png"));
        assert_eq!(first.relative_path, format!("uploads/{}", first.file_name));
        assert_eq!(first.absolute_path, tmp.path().join(&first.file_name));
        assert_eq!(std::fs::read(&first.absolute_path).unwrap(), b"first");
    }

    #[tokio::test]
    async fn remove_deletes_and_reports_missing_files() {
        let tmp = tempdir().unwrap();
        let store = UploadStore::new(tmp.path(), "uploads");
        let (_file, image) = store.create("x.gif").await.unwrap();

        store.remove(&image.relative_path).await.unwrap();
        assert!(!image.absolute_path.exists());
        assert!(matches!(
            store.remove(&image.relative_path).await,
            Err(PortfolioError::IoError(_))
        ));
    }
}
