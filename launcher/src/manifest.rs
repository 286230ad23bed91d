use crate::archive::Archive;
use crate::env::Layout;
use crate::error::LaunchError;
use std::collections::HashMap;
use std::io::{self, Read};

/// Main-section attributes of the archive manifest.
///
/// Attribute names compare case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestAttributes {
    values: HashMap<String, String>,
}

impl ManifestAttributes {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Prefix put in front of every command token.
    ///
    /// Empty when the namespace attribute is absent or blank, otherwise the
    /// namespace followed by the layout's separator.
    pub fn command_prefix(&self, layout: &Layout) -> String {
        match self.get(&layout.package_attribute) {
            Some(pkg) if !pkg.is_empty() => format!("{pkg}{}", layout.namespace_separator),
            _ => String::new(),
        }
    }

    /// Parse the main section of a manifest.
    ///
    /// `entry` only names the source in error messages.
    pub fn parse(text: &str, entry: &str) -> Result<Self, LaunchError> {
        let text = text.replace("\r\n", "\n").replace('\r', "\n");
        let malformed = |line: usize| LaunchError::Manifest {
            entry: entry.to_string(),
            line,
        };

        let mut values: HashMap<String, String> = HashMap::new();
        let mut last: Option<String> = None;
        for (index, line) in text.split('\n').enumerate() {
            if line.is_empty() {
                break;
            }
            if let Some(rest) = line.strip_prefix(' ') {
                let value = last
                    .as_ref()
                    .and_then(|key| values.get_mut(key))
                    .ok_or_else(|| malformed(index + 1))?;
                value.push_str(rest);
                continue;
            }
            match line.split_once(": ") {
                Some((name, value)) if !name.is_empty() => {
                    let key = name.to_ascii_lowercase();
                    values.insert(key.clone(), value.to_string());
                    last = Some(key);
                }
                _ => return Err(malformed(index + 1)),
            }
        }
        Ok(Self { values })
    }
}

/// Read the manifest entry named by the layout.
///
/// A missing manifest is an I/O failure; a manifest without the attributes
/// a caller wants is not.
pub fn read_manifest(archive: &mut Archive, layout: &Layout) -> Result<ManifestAttributes, LaunchError> {
    let location = archive.location().clone();
    let mut entry = archive.open_entry(&layout.manifest).map_err(|e| match e {
        LaunchError::NotFound(name) => LaunchError::io(
            format!("cannot read {name} from {location}"),
            io::Error::new(io::ErrorKind::NotFound, "no such entry"),
        ),
        other => other,
    })?;

    let mut text = String::new();
    entry
        .read_to_string(&mut text)
        .map_err(|e| LaunchError::io(format!("cannot read {}", layout.manifest), e))?;
    ManifestAttributes::parse(&text, &layout.manifest)
}
