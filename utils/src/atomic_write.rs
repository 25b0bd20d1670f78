//! Atomic file write helper.
//!
//! Uses a temp file + rename pattern: the payload is written to a temp file
//! in the destination's parent directory, synced, then renamed over the
//! target so readers never observe a partially written file.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistMode {
    /// Let the file inherit the default umask.
    #[default]
    Default,
    /// Enforce owner-only read/write permissions (0o600 on Unix).
    ///
    /// Used for files holding credentials, such as the profile store. On
    /// non-Unix platforms this is a no-op.
    SensitiveOwnerOnly,
}

/// Atomically replace the file at `path` with `contents`.
///
/// The parent directory is created if missing. The temp file lives in the
/// same directory as the target so the final rename stays on one
/// filesystem.
pub fn atomic_write(path: &Path, contents: &[u8], mode: PersistMode) -> io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("no parent directory for {}", path.display()),
        )
    })?;
    fs::create_dir_all(parent)?;

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;

    #[cfg(unix)]
    if mode == PersistMode::SensitiveOwnerOnly {
        use std::os::unix::fs::PermissionsExt;
        let perms = fs::Permissions::from_mode(0o600);
        tmp.as_file().set_permissions(perms)?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    tmp.persist(path).map_err(|e| e.error)?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "atomic write persisted");
    Ok(())
}
