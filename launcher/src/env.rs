use std::collections::HashMap;
use std::env as stdenv;
use std::ffi::OsString;
use std::path::PathBuf;

/// Variable holding the `tracing` filter directive, e.g. `ewar=debug`.
pub const LOG_VAR: &str = "EWAR_LOG";

/// Variable naming the directory bundled libraries are unpacked into.
pub const TMPDIR_VAR: &str = "EWAR_TMPDIR";

const DEFAULT_LOG_FILTER: &str = "warn";

/// Names of the reserved areas inside the archive.
///
/// The defaults follow the web-archive convention: a `WEB-INF/` metadata root
/// holding arbitrary files, a `WEB-INF/lib/` directory of bundled libraries,
/// a `WEB-INF/web.xml` descriptor that is never listed, and the manifest at
/// `META-INF/MANIFEST.MF`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Directory whose files are exposed through `--ls` and `--cat`.
    pub metadata_root: String,
    /// Prefix under which every non-directory entry is a bundled library.
    pub library_prefix: String,
    /// Descriptor entry hidden from `--ls`.
    pub descriptor: String,
    /// Entry holding the `key: value` manifest attributes.
    pub manifest: String,
    /// Manifest attribute naming the command namespace.
    pub package_attribute: String,
    /// Base name used for a library whose entry name yields nothing usable.
    pub default_library_name: String,
    /// Appended to a non-empty namespace before the command token.
    pub namespace_separator: String,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            metadata_root: "WEB-INF/".to_string(),
            library_prefix: "WEB-INF/lib/".to_string(),
            descriptor: "WEB-INF/web.xml".to_string(),
            manifest: "META-INF/MANIFEST.MF".to_string(),
            package_attribute: "Executable-War-Package".to_string(),
            default_library_name: "ewar".to_string(),
            namespace_separator: ".".to_string(),
        }
    }
}

/// Runtime settings captured from the process environment.
///
/// Self-location deliberately takes nothing from here; these only tune how
/// the launcher logs and where it writes its temporary files.
#[derive(Debug, Clone)]
pub struct Settings {
    vars: HashMap<String, String>,
}

impl Settings {
    /// Capture the current process environment.
    pub fn new() -> Self {
        Self::from_os_vars(stdenv::vars_os())
    }

    /// Build settings from raw OS pairs, skipping any pair whose name or
    /// value is not valid Unicode.
    pub fn from_os_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        Self::from_vars(vars.into_iter().filter_map(|(k, v)| {
            Some((k.into_string().ok()?, v.into_string().ok()?))
        }))
    }

    /// Build settings from an explicit set of variables.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Get the value of a captured variable. Empty values count as unset.
    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Filter directive for the log subscriber.
    pub fn log_filter(&self) -> &str {
        self.get_var(LOG_VAR).unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Directory for materialized libraries, `None` for the platform default.
    pub fn temp_dir(&self) -> Option<PathBuf> {
        self.get_var(TMPDIR_VAR).map(PathBuf::from)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}
