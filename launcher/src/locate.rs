use crate::archive::{Archive, ArchiveLocation};
use crate::error::LaunchError;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

static SELF_LOCATION: OnceLock<ArchiveLocation> = OnceLock::new();

/// Location of the archive this process is running from.
///
/// Resolved on first use from the operating system's record of the running
/// executable, never from the working directory or the environment, and
/// kept for the rest of the process.
pub fn current_archive() -> Result<&'static ArchiveLocation, LaunchError> {
    if let Some(location) = SELF_LOCATION.get() {
        return Ok(location);
    }
    let exe = std::env::current_exe()
        .map_err(|e| LaunchError::Linkage(format!("cannot locate the running executable: {e}")))?;
    let location = archive_at(&exe)?;
    debug!(location = %location, "located own archive");
    Ok(SELF_LOCATION.get_or_init(|| location))
}

/// Check that `path` is a packed archive and return its location.
///
/// A launcher started from an unpacked build tree is a plain executable
/// without a ZIP directory at its end; that is a linkage error, not an I/O
/// error, because nothing the user passes can fix it.
pub fn archive_at(path: &Path) -> Result<ArchiveLocation, LaunchError> {
    let canonical = path.canonicalize().map_err(|e| {
        LaunchError::Linkage(format!("cannot locate {}: {e}", path.display()))
    })?;
    let location = ArchiveLocation::new(canonical);
    match Archive::open(&location) {
        Ok(_) => Ok(location),
        Err(e) => Err(LaunchError::Linkage(format!(
            "expected a packed archive at {location} ({e})"
        ))),
    }
}
