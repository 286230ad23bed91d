use crate::error::LaunchError;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use zip::ZipArchive;
use zip::read::ZipFile;
use zip::result::ZipError;

/// Where the running archive's bytes live.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveLocation(PathBuf);

impl ArchiveLocation {
    /// Wrap a path. Nothing is checked until the archive is opened.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// The archive file on disk.
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ArchiveLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// An open archive.
///
/// The ZIP container may sit after arbitrary leading bytes, which is how the
/// launcher executable carries its own payload. Entries come out in the
/// order of the central directory; every walk starts from the first entry.
pub struct Archive {
    location: ArchiveLocation,
    zip: ZipArchive<BufReader<File>>,
}

impl Archive {
    /// Open the archive at `location` and read its central directory.
    ///
    /// Fails with [`LaunchError::Io`] when the file cannot be opened or holds
    /// no ZIP container.
    pub fn open(location: &ArchiveLocation) -> Result<Self, LaunchError> {
        let file = File::open(location.path())
            .map_err(|e| LaunchError::io(format!("cannot open {location}"), e))?;
        let zip = ZipArchive::new(BufReader::new(file))
            .map_err(|e| LaunchError::io(format!("cannot read {location}"), e.into()))?;
        Ok(Self {
            location: location.clone(),
            zip,
        })
    }

    pub fn location(&self) -> &ArchiveLocation {
        &self.location
    }

    /// Entry names in archive order, directories included.
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.zip.file_names()
    }

    /// Visit every entry in archive order.
    ///
    /// The callback may read as much of the entry as it likes; whatever is
    /// left is skipped before the next entry is opened. The walk stops at
    /// the first error.
    pub fn for_each_entry<F>(&mut self, mut visit: F) -> Result<(), LaunchError>
    where
        F: FnMut(&mut ArchiveEntry<'_>) -> Result<(), LaunchError>,
    {
        for index in 0..self.zip.len() {
            let file = self.zip.by_index(index).map_err(|e| {
                LaunchError::io(
                    format!("cannot read entry #{index} of {}", self.location),
                    e.into(),
                )
            })?;
            visit(&mut ArchiveEntry { file })?;
        }
        Ok(())
    }

    /// Open a single entry by its exact name.
    pub fn open_entry(&mut self, name: &str) -> Result<ArchiveEntry<'_>, LaunchError> {
        match self.zip.by_name(name) {
            Ok(file) => Ok(ArchiveEntry { file }),
            Err(ZipError::FileNotFound) => Err(LaunchError::NotFound(name.to_string())),
            Err(e) => Err(LaunchError::io(
                format!("cannot read {name} in {}", self.location),
                e.into(),
            )),
        }
    }
}

/// One entry of an [`Archive`], readable as a byte stream.
pub struct ArchiveEntry<'a> {
    file: ZipFile<'a>,
}

impl ArchiveEntry<'_> {
    /// Slash-separated path of the entry inside the archive.
    pub fn name(&self) -> &str {
        self.file.name()
    }

    pub fn is_dir(&self) -> bool {
        self.file.is_dir()
    }
}

impl Read for ArchiveEntry<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}
