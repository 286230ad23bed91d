use crate::archive::Archive;
use crate::env::Layout;
use crate::error::LaunchError;
use std::io::{self, Write};

/// Print the files of the metadata area, one per line, relative to its root.
///
/// Directories, bundled libraries and the descriptor are left out.
pub fn list_files(
    archive: &mut Archive,
    layout: &Layout,
    stdout: &mut dyn Write,
) -> Result<(), LaunchError> {
    archive.for_each_entry(|entry| {
        let name = entry.name();
        let shown = !entry.is_dir()
            && !name.starts_with(&layout.library_prefix)
            && name != layout.descriptor;
        if let Some(relative) = name.strip_prefix(&layout.metadata_root).filter(|_| shown) {
            writeln!(stdout, "{relative}").map_err(|e| LaunchError::io("cannot write listing", e))?;
        }
        Ok(())
    })?;
    stdout
        .flush()
        .map_err(|e| LaunchError::io("cannot write listing", e))
}

/// Copy one metadata-area file to `stdout` byte for byte.
///
/// Leading slashes on `path` are ignored, so `/notes.txt` and `notes.txt`
/// name the same file.
pub fn cat_file(
    archive: &mut Archive,
    layout: &Layout,
    path: &str,
    stdout: &mut dyn Write,
) -> Result<(), LaunchError> {
    let relative = path.trim_start_matches('/');
    let name = format!("{}{relative}", layout.metadata_root);
    let mut entry = archive.open_entry(&name).map_err(|e| match e {
        LaunchError::NotFound(_) => LaunchError::NotFound(relative.to_string()),
        other => other,
    })?;
    if entry.is_dir() {
        return Err(LaunchError::NotFound(relative.to_string()));
    }

    let copied = io::copy(&mut entry, stdout).and_then(|_| stdout.flush());
    copied.map_err(|e| LaunchError::io(format!("cannot copy {name}"), e))
}
