//! Collision-safe image files
//!
//! Images are written directly under the output directory. The preferred
//! name is the last path segment of the image URL. If that file cannot be
//! created (empty name, an existing file, an invalid name, a permission
//! error) a random name of lowercase letters is used instead. Existing files
//! are never overwritten.

use super::DownloadError;
use rand::Rng;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

/// Length of a fallback file name
pub const FALLBACK_NAME_LEN: usize = 10;

/// Bytes handed to the file per write call
const CHUNK_SIZE: usize = 8192;

/// Fallback names to try before giving up on clashes
const MAX_FALLBACK_ATTEMPTS: usize = 8;

/// A file written by this crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub path: PathBuf,
    /// True if the preferred name could not be used
    pub fallback: bool,
}

/// Returns the last path segment of an image URL, if it can name a file
///
/// The query string is kept as part of the name.
///
/// # Examples
///
/// ```
/// use image_harvester::download::preferred_filename;
///
/// assert_eq!(preferred_filename("https://a.com/b/logo.png"), Some("logo.png"));
/// assert_eq!(preferred_filename("https://a.com/gallery/"), None);
/// ```
pub fn preferred_filename(image_url: &str) -> Option<&str> {
    let name = image_url.rsplit('/').next()?;
    match name {
        "" | "." | ".." => None,
        name => Some(name),
    }
}

/// Generates a random file name of lowercase ASCII letters
pub fn random_filename() -> String {
    let mut rng = rand::rng();
    (0..FALLBACK_NAME_LEN)
        .map(|_| rng.random_range(b'a'..=b'z') as char)
        .collect()
}

/// Writes an image body under `output_dir`
///
/// Tries the preferred name first and falls back to random names. Only a
/// failure of the fallback step is returned as an error.
pub async fn save_image(
    output_dir: &Path,
    image_url: &str,
    body: &[u8],
) -> Result<SavedFile, DownloadError> {
    if let Some(name) = preferred_filename(image_url) {
        let path = output_dir.join(name);
        match create_new(&path).await {
            Ok(file) => {
                write_chunks(file, &path, body).await?;
                return Ok(SavedFile {
                    path,
                    fallback: false,
                });
            }
            Err(e) => {
                tracing::debug!(
                    "Cannot use {} for {}: {}, falling back to a random name",
                    path.display(),
                    image_url,
                    e
                );
            }
        }
    }

    let (file, path) = create_fallback(output_dir).await?;
    write_chunks(file, &path, body).await?;
    Ok(SavedFile {
        path,
        fallback: true,
    })
}

async fn create_new(path: &Path) -> std::io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
}

async fn create_fallback(output_dir: &Path) -> Result<(File, PathBuf), DownloadError> {
    let mut attempts = 1;

    loop {
        let path = output_dir.join(random_filename());
        match create_new(&path).await {
            Ok(file) => return Ok((file, path)),
            Err(e)
                if e.kind() == ErrorKind::AlreadyExists && attempts < MAX_FALLBACK_ATTEMPTS =>
            {
                attempts += 1;
            }
            Err(source) => return Err(DownloadError::Write { path, source }),
        }
    }
}

// A failure halfway leaves a partial file behind.
async fn write_chunks(mut file: File, path: &Path, body: &[u8]) -> Result<(), DownloadError> {
    let to_error = |source| DownloadError::Write {
        path: path.to_path_buf(),
        source,
    };

    for chunk in body.chunks(CHUNK_SIZE) {
        file.write_all(chunk).await.map_err(to_error)?;
    }
    file.flush().await.map_err(to_error)?;

    Ok(())
}
