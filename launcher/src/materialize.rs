use crate::archive::Archive;
use crate::cleanup;
use crate::env::Layout;
use crate::error::LaunchError;
use std::io::{self, Read, Write};
use std::path::Path;
use tempfile::{Builder, TempPath};
use tracing::debug;

/// A bundled library written out to its own temporary file.
///
/// The file is removed when this value is dropped, or at process exit if the
/// process ends first; failure to remove it is ignored.
#[derive(Debug)]
pub struct MaterializedLibrary {
    path: TempPath,
    entry_name: String,
}

impl MaterializedLibrary {
    fn new(path: TempPath, entry_name: String) -> Self {
        cleanup::register(&path);
        Self { path, entry_name }
    }

    /// Location of the unpacked file on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the archive entry the library came from.
    pub fn entry_name(&self) -> &str {
        &self.entry_name
    }
}

impl Drop for MaterializedLibrary {
    fn drop(&mut self) {
        cleanup::release(&self.path);
    }
}

/// Unpack every library under the layout's library prefix.
///
/// Libraries come back in archive order. Directories are skipped. Finding no
/// library at all is an error, as is any entry that cannot be opened or
/// written out in full.
pub fn materialize(
    archive: &mut Archive,
    layout: &Layout,
    temp_dir: Option<&Path>,
) -> Result<Vec<MaterializedLibrary>, LaunchError> {
    let location = archive.location().clone();
    let unpack_failure =
        |source| LaunchError::unpack(format!("cannot unpack libs from {location}"), source);

    let entry_names: Vec<String> = archive
        .entry_names()
        .filter(|name| name.starts_with(&layout.library_prefix))
        .map(str::to_string)
        .collect();

    let mut libraries = Vec::new();
    for entry_name in entry_names {
        let mut entry = archive.open_entry(&entry_name).map_err(|e| match e {
            LaunchError::Io { source, .. } => unpack_failure(Some(source)),
            _ => unpack_failure(None),
        })?;
        if entry.is_dir() {
            continue;
        }
        let (base, extension) = library_file_name(&entry_name, layout);
        let path = write_temp_file(&mut entry, &base, &extension, temp_dir)
            .map_err(|e| unpack_failure(Some(e)))?;

        debug!(entry = %entry_name, path = %path.display(), "materialized library");
        libraries.push(MaterializedLibrary::new(path, entry_name));
    }

    if libraries.is_empty() {
        return Err(LaunchError::unpack(
            format!("no files under {}", layout.library_prefix),
            None,
        ));
    }
    Ok(libraries)
}

fn write_temp_file(
    contents: &mut dyn Read,
    prefix: &str,
    suffix: &str,
    temp_dir: Option<&Path>,
) -> io::Result<TempPath> {
    let mut builder = Builder::new();
    builder.prefix(prefix).suffix(suffix);
    let mut file = match temp_dir {
        Some(dir) => builder.tempfile_in(dir)?,
        None => builder.tempfile()?,
    };
    io::copy(contents, &mut file)?;
    file.flush()?;
    Ok(file.into_temp_path())
}

/// Split a library entry name into a temporary file prefix and suffix.
///
/// `WEB-INF/lib/sub/libtools.so` gives `("libtools", ".so")`. A name with
/// nothing before its last dot falls back to the layout's default name.
pub(crate) fn library_file_name(entry_name: &str, layout: &Layout) -> (String, String) {
    let name = entry_name
        .strip_prefix(&layout.library_prefix)
        .unwrap_or(entry_name);
    let name = name.rsplit('/').next().unwrap_or(name);
    let (base, extension) = match name.rfind('.') {
        Some(dot) => (&name[..dot], &name[dot..]),
        None => (name, ""),
    };
    let base = if base.is_empty() {
        layout.default_library_name.as_str()
    } else {
        base
    };
    (base.to_string(), extension.to_string())
}
