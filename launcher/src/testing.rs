//! Fixtures shared by the unit tests: archives built on the fly and a loader
//! that treats library bytes as a plain-text component table.
//!
//! Each non-empty line of a test library names one component:
//! - `tools.Build` runs, prints `ok` and exits 0;
//! - `tools.Build=3` runs and exits 3;
//! - `tools.Build!` exists without an entry point;
//! - `tools.Build?` runs and fails with an error.

use crate::archive::ArchiveLocation;
use crate::command::{CommandLibrary, Component, EntryPoint, ExitCode, LibraryLoader};
use crate::error::LaunchError;
use crate::materialize::MaterializedLibrary;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::rc::Rc;
use tempfile::NamedTempFile;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

pub(crate) struct ArchiveBuilder {
    stub: Vec<u8>,
    entries: Vec<(String, Option<Vec<u8>>)>,
}

impl ArchiveBuilder {
    pub(crate) fn new() -> Self {
        Self {
            stub: Vec::new(),
            entries: Vec::new(),
        }
    }

    /// Bytes placed before the ZIP data, like a launcher executable.
    pub(crate) fn stub(mut self, bytes: &[u8]) -> Self {
        self.stub = bytes.to_vec();
        self
    }

    pub(crate) fn dir(mut self, name: &str) -> Self {
        self.entries.push((name.to_string(), None));
        self
    }

    pub(crate) fn file(mut self, name: &str, bytes: &[u8]) -> Self {
        self.entries.push((name.to_string(), Some(bytes.to_vec())));
        self
    }

    pub(crate) fn manifest(self, text: &str) -> Self {
        self.file("META-INF/MANIFEST.MF", text.as_bytes())
    }

    /// A library whose components are listed one per line.
    pub(crate) fn library(self, name: &str, components: &[&str]) -> Self {
        let table = components.join("\n");
        self.file(name, table.as_bytes())
    }

    pub(crate) fn build(self) -> TestArchive {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, bytes) in &self.entries {
            match bytes {
                None => zip.add_directory(name.as_str(), options).unwrap(),
                Some(bytes) => {
                    zip.start_file(name.as_str(), options).unwrap();
                    zip.write_all(bytes).unwrap();
                }
            }
        }
        let payload = zip.finish().unwrap().into_inner();

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&self.stub).unwrap();
        file.write_all(&payload).unwrap();
        file.flush().unwrap();
        let location = ArchiveLocation::new(file.path());
        TestArchive {
            _file: file,
            location,
        }
    }
}

pub(crate) struct TestArchive {
    _file: NamedTempFile,
    location: ArchiveLocation,
}

impl TestArchive {
    pub(crate) fn location(&self) -> &ArchiveLocation {
        &self.location
    }
}

/// One recorded entry point call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Call {
    pub(crate) origin: String,
    pub(crate) component: String,
    pub(crate) args: Vec<String>,
}

/// Shared record of what the test entry points did.
#[derive(Clone, Default)]
pub(crate) struct Record {
    pub(crate) calls: Rc<RefCell<Vec<Call>>>,
    pub(crate) stdout: Rc<RefCell<Vec<u8>>>,
}

impl Record {
    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn stdout(&self) -> String {
        String::from_utf8(self.stdout.borrow().clone()).unwrap()
    }
}

/// Loader reading the text tables written by [`ArchiveBuilder::library`].
#[derive(Clone, Default)]
pub(crate) struct TableLoader {
    pub(crate) record: Record,
    pub(crate) loaded: Rc<RefCell<Vec<String>>>,
}

impl LibraryLoader for TableLoader {
    fn load(&self, library: &MaterializedLibrary) -> Result<Box<dyn CommandLibrary>, LaunchError> {
        let text = std::fs::read_to_string(library.path())
            .map_err(|e| LaunchError::io("cannot read test library", e))?;
        self.loaded.borrow_mut().push(library.entry_name().to_string());

        let mut components = HashMap::new();
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let (name, behavior) = if let Some(name) = line.strip_suffix('!') {
                (name, None)
            } else if let Some(name) = line.strip_suffix('?') {
                (name, Some(Behavior::Fail))
            } else if let Some((name, code)) = line.split_once('=') {
                (name, Some(Behavior::Exit(code.parse().unwrap())))
            } else {
                (line, Some(Behavior::PrintOk))
            };
            components.entry(name.to_string()).or_insert_with(|| {
                behavior.map(|behavior| TableEntry {
                    origin: library.entry_name().to_string(),
                    component: name.to_string(),
                    behavior,
                    record: self.record.clone(),
                })
            });
        }
        Ok(Box::new(TableLibrary {
            origin: library.entry_name().to_string(),
            components,
        }))
    }
}

#[derive(Clone, Copy)]
enum Behavior {
    PrintOk,
    Exit(ExitCode),
    Fail,
}

struct TableEntry {
    origin: String,
    component: String,
    behavior: Behavior,
    record: Record,
}

impl EntryPoint for TableEntry {
    fn invoke(&self, args: &[String]) -> Result<ExitCode, LaunchError> {
        self.record.calls.borrow_mut().push(Call {
            origin: self.origin.clone(),
            component: self.component.clone(),
            args: args.to_vec(),
        });
        match self.behavior {
            Behavior::PrintOk => {
                writeln!(self.record.stdout.borrow_mut(), "ok")
                    .map_err(|e| LaunchError::Command(e.into()))?;
                Ok(0)
            }
            Behavior::Exit(code) => Ok(code),
            Behavior::Fail => Err(anyhow::anyhow!("{} blew up", self.component).into()),
        }
    }
}

struct TableLibrary {
    origin: String,
    components: HashMap<String, Option<TableEntry>>,
}

impl CommandLibrary for TableLibrary {
    fn origin(&self) -> &str {
        &self.origin
    }

    fn component(&self, qualified: &str) -> Option<Component<'_>> {
        self.components.get(qualified).map(|entry| match entry {
            Some(entry) => Component::Runnable(entry),
            None => Component::NotRunnable,
        })
    }

    fn len(&self) -> usize {
        self.components.len()
    }
}
