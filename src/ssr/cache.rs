use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwapOption;
use bytes::Bytes;

use super::Result;
use crate::fsutil;

/// The SPA shell compiled into the binary.
pub const EMBEDDED_SHELL: &[u8] = include_bytes!("../../web/index.html");

/// Holds the current HTML shell.
///
/// Readers get an immutable snapshot; a reload swaps the whole buffer atomically, so a
/// request that already loaded a snapshot keeps serving that version.
#[derive(Debug, Default)]
pub struct HtmlCache {
    current: ArcSwapOption<Bytes>,
}

impl HtmlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a non-empty document is loaded.
    pub fn has_cache(&self) -> bool {
        self.current
            .load_full()
            .is_some_and(|document| !document.is_empty())
    }

    /// Returns the current document snapshot, if any.
    ///
    /// Cloning [`Bytes`] shares the buffer; nothing is copied.
    pub fn get(&self) -> Option<Bytes> {
        self.current
            .load_full()
            .filter(|document| !document.is_empty())
            .map(|document| Bytes::clone(&document))
    }

    pub fn load_from_bytes(&self, document: impl Into<Bytes>) {
        let document = document.into();
        log::debug!("Loaded HTML shell ({} bytes)", document.len());
        self.current.store(Some(Arc::new(document)));
    }

    /// Replaces the document with the contents of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`super::Error::LoadCache`] if the file cannot be read. The previously
    /// loaded document stays in place.
    pub fn load_from_disk(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let document = fsutil::read_file(path)?;
        log::info!("Loaded HTML shell from `{}`", path.display());
        self.load_from_bytes(document);
        Ok(())
    }
}
