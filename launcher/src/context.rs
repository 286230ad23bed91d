use crate::command::{CommandLibrary, Component, LibraryLoader};
use crate::error::LaunchError;
use crate::materialize::MaterializedLibrary;
use tracing::debug;

/// Resolution scope made of exactly the bundled libraries.
///
/// Names are looked up in the libraries in the order they were given and
/// the first library defining a name wins. Nothing outside these libraries
/// is ever consulted.
pub struct ExecutionContext {
    libraries: Vec<Box<dyn CommandLibrary>>,
    // Dropped after the loaded libraries, which deletes the unpacked files.
    _materialized: Vec<MaterializedLibrary>,
}

impl ExecutionContext {
    /// Load every library with `loader`, keeping their order.
    ///
    /// The context takes ownership of the unpacked files and deletes them
    /// once the loaded libraries are gone.
    pub fn build(
        materialized: Vec<MaterializedLibrary>,
        loader: &dyn LibraryLoader,
    ) -> Result<Self, LaunchError> {
        if materialized.is_empty() {
            return Err(LaunchError::unpack(
                "no bundled libraries to build an execution context from",
                None,
            ));
        }

        let mut libraries = Vec::with_capacity(materialized.len());
        for library in &materialized {
            let loaded = loader.load(library)?;
            debug!(
                library = %library.entry_name(),
                components = loaded.len(),
                "loaded library"
            );
            libraries.push(loaded);
        }

        Ok(Self {
            libraries,
            _materialized: materialized,
        })
    }

    /// Find a component by fully-qualified name.
    pub fn component(&self, qualified: &str) -> Option<Component<'_>> {
        self.libraries
            .iter()
            .find_map(|library| library.component(qualified))
    }

    /// Origins of the loaded libraries, in search order.
    #[cfg(test)]
    pub(crate) fn origins(&self) -> impl Iterator<Item = &str> {
        self.libraries.iter().map(|library| library.origin())
    }
}
