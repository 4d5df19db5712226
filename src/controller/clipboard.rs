//! Clipboard seam used by the copy action.

use crate::error::{IoError, Result};
use std::path::{Path, PathBuf};

/// Destination for copied hint text.
pub trait Clipboard {
    /// Replaces the clipboard contents with `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the clipboard cannot be written.
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// In-process clipboard. Can be told to fail for testing feedback paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Option<String>,
    fail: bool,
}

impl MemoryClipboard {
    /// Creates an empty clipboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clipboard that refuses every write.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            contents: None,
            fail: true,
        }
    }

    /// Returns the last copied text.
    #[must_use]
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl Clipboard for MemoryClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.fail {
            return Err(IoError::Generic("clipboard unavailable".to_string()).into());
        }
        self.contents = Some(text.to_string());
        Ok(())
    }
}

/// Writes copied text to a file, overwriting it.
#[derive(Debug, Clone)]
pub struct FileClipboard {
    path: PathBuf,
}

impl FileClipboard {
    /// Creates a clipboard writing to `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the target path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Clipboard for FileClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        std::fs::write(&self.path, text).map_err(|e| {
            IoError::WriteFailed {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

/// The desktop clipboard.
///
/// On Linux the selection is owned by the writing process and disappears when
/// it exits, so [`Clipboard::set_text`] blocks until another client takes the
/// clipboard over. Elsewhere the text outlives the process and the call
/// returns at once.
#[cfg(feature = "system-clipboard")]
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

#[cfg(feature = "system-clipboard")]
impl SystemClipboard {
    /// Whether writes block while this process serves the selection.
    pub const HOLDS_SELECTION: bool = cfg!(target_os = "linux");

    /// Connects to the desktop clipboard.
    ///
    /// # Errors
    ///
    /// Returns an error when no clipboard is available (for example on a
    /// headless host).
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new()
            .map_err(|e| IoError::Generic(format!("clipboard unavailable: {e}")))?;
        Ok(Self { inner })
    }
}

#[cfg(feature = "system-clipboard")]
impl Clipboard for SystemClipboard {
    #[cfg(target_os = "linux")]
    fn set_text(&mut self, text: &str) -> Result<()> {
        use arboard::SetExtLinux;

        tracing::info!("serving clipboard selection until another application takes it");
        self.inner
            .set()
            .wait()
            .text(text.to_string())
            .map_err(|e| IoError::Generic(format!("clipboard write failed: {e}")).into())
    }

    #[cfg(not(target_os = "linux"))]
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.inner
            .set_text(text.to_string())
            .map_err(|e| IoError::Generic(format!("clipboard write failed: {e}")).into())
    }
}
