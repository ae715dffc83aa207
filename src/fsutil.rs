use std::io;
use std::path::{Path, PathBuf};

/// Error that occurs when reading a file fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to read file `{path}`: {source}")]
pub struct FileReadError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Reads the whole file at the given path.
///
/// # Errors
///
/// Returns a [`FileReadError`] if the file cannot be opened or read.
///
/// # Example
/// ```no_run
/// # use admin_console::fsutil;
/// let shell = fsutil::read_file("web/index.html")?;
/// # Ok::<(), fsutil::FileReadError>(())
/// ```
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>, FileReadError> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|source| FileReadError {
        path: path.to_path_buf(),
        source,
    })
}

/// Async counterpart of [`read_file`] for request handlers.
pub async fn read_file_async(path: impl AsRef<Path>) -> Result<Vec<u8>, FileReadError> {
    let path = path.as_ref();
    tokio::fs::read(path).await.map_err(|source| FileReadError {
        path: path.to_path_buf(),
        source,
    })
}
