use crate::abi::{EntryFn, REGISTRATION_SYMBOL, RegistrationFn};
use crate::command::{CommandLibrary, Component, EntryPoint, ExitCode, LibraryLoader};
use crate::error::LaunchError;
use crate::materialize::MaterializedLibrary;
use std::collections::HashMap;
use std::ffi::{CString, c_char};
use std::path::Path;
use std::ptr;
use tracing::warn;

/// Loads materialized libraries as native shared objects.
///
/// Each library gets its own private handle. On Unix the handle is opened
/// with `RTLD_LOCAL`, so nothing it defines becomes visible to the rest of
/// the process, and components are only ever found through the library's
/// own registration table.
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeLoader;

impl LibraryLoader for NativeLoader {
    fn load(&self, library: &MaterializedLibrary) -> Result<Box<dyn CommandLibrary>, LaunchError> {
        let origin = library.entry_name().to_string();
        let handle = open_private(library.path())
            .map_err(|e| LaunchError::Linkage(format!("cannot load {origin}: {e}")))?;

        let register = unsafe { handle.get::<RegistrationFn>(REGISTRATION_SYMBOL.as_bytes()) }
            .ok()
            .map(|symbol| *symbol);
        let components = match register {
            Some(register) => unsafe { register().components() },
            None => {
                warn!(library = %origin, "library exports no {REGISTRATION_SYMBOL} table");
                Vec::new()
            }
        };

        Ok(Box::new(NativeLibrary::new(origin, components, handle)))
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> Result<libloading::Library, libloading::Error> {
    use libloading::os::unix::{Library, RTLD_LOCAL, RTLD_NOW};
    unsafe { Library::open(Some(path), RTLD_NOW | RTLD_LOCAL) }.map(Into::into)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> Result<libloading::Library, libloading::Error> {
    unsafe { libloading::Library::new(path) }
}

struct NativeLibrary {
    origin: String,
    components: HashMap<String, Option<NativeEntry>>,
    // Declared last so the handle is closed after the entry points are gone.
    _handle: libloading::Library,
}

impl NativeLibrary {
    fn new(
        origin: String,
        table: Vec<(String, Option<EntryFn>)>,
        handle: libloading::Library,
    ) -> Self {
        let mut components = HashMap::with_capacity(table.len());
        for (name, main) in table {
            components
                .entry(name)
                .or_insert_with(|| main.map(|main| NativeEntry { main }));
        }
        Self {
            origin,
            components,
            _handle: handle,
        }
    }
}

impl CommandLibrary for NativeLibrary {
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

/// Entry point living inside a loaded library.
///
/// Only reachable through a borrow of its [`NativeLibrary`], so the code it
/// points at stays mapped for as long as it can be called.
pub(crate) struct NativeEntry {
    main: EntryFn,
}

impl EntryPoint for NativeEntry {
    fn invoke(&self, args: &[String]) -> Result<ExitCode, LaunchError> {
        let owned = args
            .iter()
            .map(|arg| {
                CString::new(arg.as_str()).map_err(|_| LaunchError::InvalidArgument(arg.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mut argv: Vec<*const c_char> = owned.iter().map(|arg| arg.as_ptr()).collect();
        argv.push(ptr::null());

        Ok(unsafe { (self.main)(owned.len(), argv.as_ptr()) })
    }
}
