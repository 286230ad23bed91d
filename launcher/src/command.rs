use crate::error::LaunchError;
use crate::materialize::MaterializedLibrary;

/// Conventional process exit code type used by this crate.
///
/// A value of 0 indicates success; any non-zero value indicates failure.
pub type ExitCode = i32;

/// The standard entry point a runnable component exposes.
///
/// It takes the forwarded arguments, without the command token, and returns
/// the exit code for the whole process. Errors raised by the command itself
/// come back as [`LaunchError::Command`] and are passed through untouched;
/// arguments the entry point cannot accept are the launcher's own error.
pub trait EntryPoint {
    fn invoke(&self, args: &[String]) -> Result<ExitCode, LaunchError>;
}

/// What a library knows about a fully-qualified component name.
pub enum Component<'a> {
    /// The component exists and can be invoked.
    Runnable(&'a dyn EntryPoint),
    /// The component exists but has no usable entry point.
    NotRunnable,
}

/// A loaded library seen as a table of named components.
pub trait CommandLibrary {
    /// Name of the archive entry this library was unpacked from.
    fn origin(&self) -> &str;

    /// Look up a fully-qualified component name.
    ///
    /// Returns `None` when the library does not define the name at all.
    fn component(&self, qualified: &str) -> Option<Component<'_>>;

    /// Number of components this library registered.
    fn len(&self) -> usize;
}

/// Turns an unpacked library file into a [`CommandLibrary`].
pub trait LibraryLoader {
    fn load(&self, library: &MaterializedLibrary) -> Result<Box<dyn CommandLibrary>, LaunchError>;
}
