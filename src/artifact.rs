//! Transient synthesized-audio artifacts
//!
//! Synthesized speech is staged in a temp file and consumed exactly once
//! by the render step. The backing file is removed on consumption, and
//! the `NamedTempFile` guard removes it on drop for any path that never
//! reaches playback.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::{Error, Result};

/// MP3 audio staged for a single playback handoff
#[derive(Debug)]
pub struct AudioArtifact {
    file: NamedTempFile,
    len: usize,
}

impl AudioArtifact {
    /// Stage synthesized MP3 bytes in a temp file
    ///
    /// # Errors
    ///
    /// Returns error if the temp file cannot be created or written
    pub fn from_mp3(bytes: &[u8]) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("sada-")
            .suffix(".mp3")
            .tempfile()
            .map_err(Error::Io)?;

        file.write_all(bytes).map_err(Error::Io)?;
        file.flush().map_err(Error::Io)?;

        tracing::debug!(
            path = %file.path().display(),
            bytes = bytes.len(),
            "audio artifact staged"
        );

        Ok(Self {
            file,
            len: bytes.len(),
        })
    }

    /// Path of the backing file (valid until consumption or drop)
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Size of the staged audio in bytes
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the artifact holds no audio
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Consume the artifact, returning the audio bytes and deleting the
    /// backing file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read back; the backing file
    /// is removed in that case too
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        let path = self.file.path().to_path_buf();
        let bytes = std::fs::read(&path).map_err(Error::Io);
        // NamedTempFile removes the file when the guard drops, so the
        // error path cannot leak it either.
        drop(self.file);
        tracing::debug!(path = %path.display(), "audio artifact consumed");
        bytes
    }
}
